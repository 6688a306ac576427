use crate::splitter::MAX_CONTROL_NUMBER;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_SOURCE: &str = "EDI_SPLIT_SOURCE";
pub const ENV_DESTINATION: &str = "EDI_SPLIT_DESTINATION";
pub const ENV_CONTROL_SEED: &str = "EDI_SPLIT_CONTROL_SEED";
pub const ENV_ON_MALFORMED: &str = "EDI_SPLIT_ON_MALFORMED";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Control number seed must be between 1 and {max}, got {seed}")]
    InvalidControlSeed { seed: u64, max: u64 },
}

/// What to do with a source file that fails to parse or validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the file as skipped and continue with the next one
    #[default]
    Skip,
    /// End the whole job with an error
    Abort,
}

impl FailurePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(Self::Skip),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub failure_policy: FailurePolicy,
    /// First control number handed out. Default: 1
    pub control_seed: u64,
    /// Newline after every segment terminator in output files
    pub line_breaks: bool,
    /// Also bundle units into `archives/{client}.zip`
    pub archive_by_client: bool,
    /// Write `split-report.json` into the destination at the end
    pub write_report: bool,
}

impl SplitterConfig {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            failure_policy: FailurePolicy::Skip,
            control_seed: 1,
            line_breaks: false,
            archive_by_client: false,
            write_report: false,
        }
    }

    /// Build from `EDI_SPLIT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source = lookup(ENV_SOURCE)
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_SOURCE.to_string()))?;
        let destination = lookup(ENV_DESTINATION)
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_DESTINATION.to_string()))?;

        Self::new(source, destination).with_options_from(lookup)
    }

    /// Apply the optional `EDI_SPLIT_*` variables on top of this config
    pub fn with_env_options(self) -> Result<Self, ConfigError> {
        self.with_options_from(|key| env::var(key).ok())
    }

    fn with_options_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_CONTROL_SEED) {
            self.control_seed = value.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: ENV_CONTROL_SEED.to_string(),
                    value: value.clone(),
                }
            })?;
        }

        if let Some(value) = lookup(ENV_ON_MALFORMED) {
            self.failure_policy =
                FailurePolicy::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_ON_MALFORMED.to_string(),
                    value: value.clone(),
                })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_seed == 0 || self.control_seed > MAX_CONTROL_NUMBER {
            return Err(ConfigError::InvalidControlSeed {
                seed: self.control_seed,
                max: MAX_CONTROL_NUMBER,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SplitterConfig::new("in", "out");
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.control_seed, 1);
        assert!(!config.write_report);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = SplitterConfig::from_lookup(lookup(&[
            (ENV_SOURCE, "/data/in"),
            (ENV_DESTINATION, "/data/out"),
            (ENV_CONTROL_SEED, "5000"),
            (ENV_ON_MALFORMED, "Abort"),
        ]))
        .unwrap();

        assert_eq!(config.source, PathBuf::from("/data/in"));
        assert_eq!(config.destination, PathBuf::from("/data/out"));
        assert_eq!(config.control_seed, 5000);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_missing_source() {
        let result = SplitterConfig::from_lookup(lookup(&[(ENV_DESTINATION, "/data/out")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar(ENV_SOURCE.to_string())
        );
    }

    #[test]
    fn test_invalid_policy() {
        let result = SplitterConfig::from_lookup(lookup(&[
            (ENV_SOURCE, "in"),
            (ENV_DESTINATION, "out"),
            (ENV_ON_MALFORMED, "ignore"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_seed_out_of_range() {
        let result = SplitterConfig::from_lookup(lookup(&[
            (ENV_SOURCE, "in"),
            (ENV_DESTINATION, "out"),
            (ENV_CONTROL_SEED, "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidControlSeed { seed: 0, .. })
        ));
    }
}
