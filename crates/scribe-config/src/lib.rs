use anyhow::Context;
use scribe_core::{CleanOptions, DEFAULT_TOKEN_LIMIT, DEFAULT_TOKENIZER, SplitMethod};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration for scribe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_token_limit")]
    pub token_limit: usize,

    #[serde(default = "default_tokenizer")]
    pub default_tokenizer: String,

    #[serde(default)]
    pub split: SplitConfig,

    #[serde(default)]
    pub clean: CleanOptions,

    #[serde(default)]
    pub cost: CostConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default)]
    pub method: SplitMethod,

    /// Only used by the custom method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    #[serde(default = "default_target_models")]
    pub target_models: Vec<String>,

    /// Tokens per month currently sent to a hosted API, for the ROI projection
    #[serde(default = "default_api_usage")]
    pub api_usage_monthly: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_limit: default_token_limit(),
            default_tokenizer: default_tokenizer(),
            split: SplitConfig::default(),
            clean: CleanOptions::default(),
            cost: CostConfig::default(),
        }
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            target_models: default_target_models(),
            api_usage_monthly: default_api_usage(),
        }
    }
}

fn default_token_limit() -> usize {
    DEFAULT_TOKEN_LIMIT
}

fn default_tokenizer() -> String {
    DEFAULT_TOKENIZER.to_string()
}

fn default_target_models() -> Vec<String> {
    vec![
        "llama-2-7b".to_string(),
        "llama-2-13b".to_string(),
        "claude-3-haiku".to_string(),
    ]
}

fn default_api_usage() -> u64 {
    100_000
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing the defaults there if it is missing
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?;
            Ok(config)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            Ok(config)
        }
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("ai", "wolflow", "scribe") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.scribe/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.token_limit, 512);
        assert_eq!(config.default_tokenizer, "gpt2");
        assert_eq!(config.split.method, SplitMethod::Paragraph);
        assert_eq!(config.cost.target_models.len(), 3);
        assert_eq!(config.cost.api_usage_monthly, 100_000);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            "token_limit = 1024\n[split]\nmethod = \"custom\"\ndelimiter = \"###\"\n",
        )
        .unwrap();

        assert_eq!(parsed.token_limit, 1024);
        assert_eq!(parsed.split.method, SplitMethod::Custom);
        assert_eq!(parsed.split.delimiter.as_deref(), Some("###"));
        assert_eq!(parsed.default_tokenizer, "gpt2");
        assert!(parsed.clean.normalize_whitespace);
    }

    #[test]
    fn test_load_from_creates_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), created);
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "token_limit = \"lots\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }
}
