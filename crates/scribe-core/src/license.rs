//! License gate seam
//!
//! The tokenizer registry and the processing controller only ask yes/no
//! questions through [`LicenseGate`]; how entitlements are stored lives
//! elsewhere (see `scribe-storage`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DEFAULT_TOKENIZER;

/// Premium capabilities a gate can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    AdvancedCostAnalysis,
    AdvancedAnalytics,
    PremiumTokenizers,
    ExportReports,
    SessionHistory,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Self::AdvancedCostAnalysis,
        Self::AdvancedAnalytics,
        Self::PremiumTokenizers,
        Self::ExportReports,
        Self::SessionHistory,
    ];

    /// Look up a feature by its `as_str` name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdvancedCostAnalysis => "advanced_cost_analysis",
            Self::AdvancedAnalytics => "advanced_analytics",
            Self::PremiumTokenizers => "premium_tokenizers",
            Self::ExportReports => "export_reports",
            Self::SessionHistory => "session_history",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AdvancedCostAnalysis => "Training cost analysis across local, cloud and API approaches",
            Self::AdvancedAnalytics => "Efficiency scoring and tokenizer-aware recommendations",
            Self::PremiumTokenizers => "Exact tokenization for GPT-3.5, GPT-4, GPT-4o and more",
            Self::ExportReports => "Cost report export to JSON, CSV and text",
            Self::SessionHistory => "Saved sessions with analysis history",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Free,
    Trial,
    Active,
    Expired,
}

impl LicenseStatus {
    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Trial | Self::Active)
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Free => "free",
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Expired => "expired",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicensingInfo {
    pub license_status: LicenseStatus,
    pub premium_licensed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_days_remaining: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeInfo {
    pub premium_features: Vec<String>,
    pub current_status: LicenseStatus,
}

/// Capability oracle consulted before premium operations
pub trait LicenseGate: Send + Sync {
    fn check_feature_access(&self, feature_name: &str) -> bool;

    fn check_tokenizer_access(&self, tokenizer_name: &str) -> bool;

    fn licensing_info(&self) -> LicensingInfo;

    fn upgrade_info(&self) -> UpgradeInfo {
        UpgradeInfo {
            premium_features: Feature::ALL
                .iter()
                .map(|f| f.description().to_string())
                .collect(),
            current_status: self.licensing_info().license_status,
        }
    }

    /// Begin a trial; returns false when a trial cannot be started
    fn start_trial(&mut self) -> bool;
}

/// Fixed entitlement, for embedding and tests
#[derive(Debug, Clone, Copy)]
pub struct StaticLicense {
    status: LicenseStatus,
}

impl StaticLicense {
    pub fn free() -> Self {
        Self {
            status: LicenseStatus::Free,
        }
    }

    pub fn premium() -> Self {
        Self {
            status: LicenseStatus::Active,
        }
    }
}

impl LicenseGate for StaticLicense {
    fn check_feature_access(&self, feature_name: &str) -> bool {
        self.status.is_premium() && Feature::from_name(feature_name).is_some()
    }

    fn check_tokenizer_access(&self, tokenizer_name: &str) -> bool {
        self.status.is_premium() || tokenizer_name == DEFAULT_TOKENIZER
    }

    fn licensing_info(&self) -> LicensingInfo {
        LicensingInfo {
            license_status: self.status,
            premium_licensed: self.status.is_premium(),
            trial_days_remaining: None,
        }
    }

    fn start_trial(&mut self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_free() {
        let gate = StaticLicense::free();
        assert!(!gate.check_feature_access(Feature::AdvancedCostAnalysis.as_str()));
        assert!(gate.check_tokenizer_access(DEFAULT_TOKENIZER));
        assert!(!gate.check_tokenizer_access("gpt-4"));
        assert_eq!(gate.upgrade_info().current_status, LicenseStatus::Free);
        assert_eq!(gate.upgrade_info().premium_features.len(), Feature::ALL.len());
    }

    #[test]
    fn test_static_premium() {
        let mut gate = StaticLicense::premium();
        assert!(gate.check_feature_access("advanced_cost_analysis"));
        assert!(gate.check_tokenizer_access("gpt-4"));
        assert!(gate.licensing_info().premium_licensed);
        assert!(!gate.start_trial());
    }

    #[test]
    fn test_unknown_feature_denied() {
        let gate = StaticLicense::premium();
        assert!(!gate.check_feature_access("advanced_cost_anaylsis"));
        assert!(!gate.check_feature_access(""));
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.as_str()), Some(feature));
            assert!(gate.check_feature_access(feature.as_str()));
        }
    }
}
