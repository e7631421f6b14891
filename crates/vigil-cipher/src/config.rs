//! Analysis Configuration
//!
//! Tunables for the cryptanalysis pipeline, with environment overrides
//! under the `VIGIL_` prefix.

use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Symbol set for all cipher arithmetic.
    pub alphabet: String,
    /// Smallest key period the estimator considers.
    pub min_key_length: usize,
    /// Largest key period the estimator considers.
    pub max_key_length: usize,
    /// Kasiski n-gram size.
    pub seed_len: usize,
    /// Floor on filtered ciphertext length for automatic analysis.
    pub min_ciphertext_len: usize,
    /// Caller-side deadline for one orchestrated run.
    pub timeout_ms: u64,
    /// Reference distribution and dictionary.
    pub language: Language,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alphabet: ('A'..='Z').collect(),
            min_key_length: 2,
            max_key_length: 30,
            seed_len: 3,
            min_ciphertext_len: 50,
            timeout_ms: 30_000,
            language: Language::English,
        }
    }
}

impl AnalysisConfig {
    /// Defaults overridden by `VIGIL_*` environment variables. Unparseable
    /// values are ignored in favor of the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("VIGIL_ALPHABET") {
            if !v.is_empty() {
                config.alphabet = v;
            }
        }
        if let Some(v) = env_usize("VIGIL_MIN_KEY_LENGTH") {
            config.min_key_length = v;
        }
        if let Some(v) = env_usize("VIGIL_MAX_KEY_LENGTH") {
            config.max_key_length = v;
        }
        if let Some(v) = env_usize("VIGIL_SEED_LEN") {
            config.seed_len = v;
        }
        if let Some(v) = env_usize("VIGIL_MIN_CIPHERTEXT_LEN") {
            config.min_ciphertext_len = v;
        }
        if let Some(v) = env_usize("VIGIL_TIMEOUT_MS") {
            config.timeout_ms = v as u64;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_key_length == 0 || self.min_key_length > self.max_key_length {
            return Err(Error::InvalidConfig(format!(
                "key length range {}..={} is empty",
                self.min_key_length, self.max_key_length
            )));
        }
        if self.seed_len < 2 {
            return Err(Error::InvalidConfig(format!(
                "seed length {} is too short to witness repetition",
                self.seed_len
            )));
        }
        Ok(())
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.alphabet.len(), 26);
        assert_eq!(config.min_key_length, 2);
        assert_eq!(config.max_key_length, 30);
        assert_eq!(config.seed_len, 3);
        assert_eq!(config.min_ciphertext_len, 50);
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        let config = AnalysisConfig {
            min_key_length: 10,
            max_key_length: 5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = AnalysisConfig {
            seed_len: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_env_overrides() {
        // Process-wide env: use names no other test touches.
        std::env::set_var("VIGIL_SEED_LEN", "4");
        std::env::set_var("VIGIL_MAX_KEY_LENGTH", "not-a-number");
        let config = AnalysisConfig::from_env();
        assert_eq!(config.seed_len, 4);
        assert_eq!(config.max_key_length, 30);
        std::env::remove_var("VIGIL_SEED_LEN");
        std::env::remove_var("VIGIL_MAX_KEY_LENGTH");
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = AnalysisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
