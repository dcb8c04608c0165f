//! File-backed license and trial state

use std::path::{Path, PathBuf};

use scribe_core::{DEFAULT_TOKENIZER, Feature, LicenseGate, LicenseStatus, LicensingInfo};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Result, StorageError};

pub const TRIAL_DAYS: i64 = 7;

const KEY_PREFIX: &str = "WS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LicenseState {
    #[serde(default, with = "time::serde::timestamp::option")]
    trial_started_at: Option<OffsetDateTime>,
    #[serde(default)]
    license_key: Option<String>,
}

/// License gate persisted as JSON in the data directory
///
/// A trial can be started once and lasts [`TRIAL_DAYS`]. An activated key
/// takes precedence over any trial state.
#[derive(Debug, Clone)]
pub struct FileLicense {
    path: PathBuf,
    state: LicenseState,
}

impl FileLicense {
    /// Load license state from `path`; a missing file means a free license
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            LicenseState::default()
        };
        Ok(Self { path, state })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        crate::data_dir().join("license.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> LicenseStatus {
        self.status_at(OffsetDateTime::now_utc())
    }

    pub fn status_at(&self, now: OffsetDateTime) -> LicenseStatus {
        if self.state.license_key.is_some() {
            return LicenseStatus::Active;
        }
        match self.trial_ends_at() {
            Some(end) if now < end => LicenseStatus::Trial,
            Some(_) => LicenseStatus::Expired,
            None => LicenseStatus::Free,
        }
    }

    /// Whole days left in a running trial, rounded up
    pub fn trial_days_remaining_at(&self, now: OffsetDateTime) -> Option<i64> {
        if self.status_at(now) != LicenseStatus::Trial {
            return None;
        }
        let left = self.trial_ends_at()? - now;
        Some((left.whole_seconds() + 86_399) / 86_400)
    }

    fn trial_ends_at(&self) -> Option<OffsetDateTime> {
        self.state
            .trial_started_at
            .map(|start| start + Duration::days(TRIAL_DAYS))
    }

    /// Start the one-time trial at `now`; false if one was already started
    pub fn start_trial_at(&mut self, now: OffsetDateTime) -> Result<bool> {
        if self.state.trial_started_at.is_some() {
            return Ok(false);
        }
        self.state.trial_started_at = Some(now);
        if let Err(e) = self.save() {
            self.state.trial_started_at = None;
            return Err(e);
        }
        tracing::info!(days = TRIAL_DAYS, "Started trial");
        Ok(true)
    }

    /// Store a license key after checking its shape and check group
    pub fn activate(&mut self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        self.state.license_key = Some(key);
        self.save()?;
        tracing::info!("License activated");
        Ok(())
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.state)?)?;
        Ok(())
    }
}

impl LicenseGate for FileLicense {
    fn check_feature_access(&self, feature_name: &str) -> bool {
        Feature::from_name(feature_name).is_some() && self.status().is_premium()
    }

    fn check_tokenizer_access(&self, tokenizer_name: &str) -> bool {
        tokenizer_name == DEFAULT_TOKENIZER || self.status().is_premium()
    }

    fn licensing_info(&self) -> LicensingInfo {
        let now = OffsetDateTime::now_utc();
        let status = self.status_at(now);
        LicensingInfo {
            license_status: status,
            premium_licensed: status.is_premium(),
            trial_days_remaining: self.trial_days_remaining_at(now),
        }
    }

    fn start_trial(&mut self) -> bool {
        match self.start_trial_at(OffsetDateTime::now_utc()) {
            Ok(started) => started,
            Err(e) => {
                tracing::warn!("Failed to persist trial state: {}", e);
                false
            }
        }
    }
}

fn check_group(first: &str, second: &str) -> String {
    let digest = blake3::hash(format!("{}-{}-{}", KEY_PREFIX, first, second).as_bytes());
    digest.to_hex()[..4].to_ascii_uppercase()
}

fn is_group(group: &str) -> bool {
    group.len() == 4 && group.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Build a key `WS-AAAA-BBBB-CCCC` whose last group checks the first two
pub fn issue_key(first: &str, second: &str) -> Result<String> {
    let (first, second) = (first.to_ascii_uppercase(), second.to_ascii_uppercase());
    if !is_group(&first) || !is_group(&second) {
        return Err(StorageError::InvalidLicenseKey(
            "key groups must be four letters or digits".to_string(),
        ));
    }
    let check = check_group(&first, &second);
    Ok(format!("{}-{}-{}-{}", KEY_PREFIX, first, second, check))
}

/// Normalize a key and verify its shape and check group
pub fn validate_key(key: &str) -> Result<String> {
    let normalized = key.trim().to_ascii_uppercase();
    let groups: Vec<&str> = normalized.split('-').collect();

    let [prefix, first, second, check] = groups.as_slice() else {
        return Err(StorageError::InvalidLicenseKey(format!(
            "expected {}-XXXX-XXXX-XXXX",
            KEY_PREFIX
        )));
    };
    if *prefix != KEY_PREFIX || ![first, second, check].iter().all(|g| is_group(g)) {
        return Err(StorageError::InvalidLicenseKey(format!(
            "expected {}-XXXX-XXXX-XXXX",
            KEY_PREFIX
        )));
    }
    if check_group(first, second) != *check {
        return Err(StorageError::InvalidLicenseKey(
            "check group does not match".to_string(),
        ));
    }
    Ok(normalized)
}
