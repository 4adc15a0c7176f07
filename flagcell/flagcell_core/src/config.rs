//! Configuration for flags and the stress harness.
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! file is a valid configuration.

use crate::error::{FlagError, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for a single [`SyncedFlag`](crate::SyncedFlag).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlagConfig {
    /// Name used when tracing lock activity
    pub name: Option<String>,
}

/// Workload sizes for the stress harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StressConfig {
    /// Threads that each flip once per parity round
    pub threads: usize,

    /// Number of parity rounds
    pub rounds: usize,

    /// Reader threads in the mixed workload
    pub readers: usize,

    /// Writer threads in the mixed workload
    pub writers: usize,

    /// Operations per reader or writer thread
    pub iterations: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            rounds: 4,
            readers: 4,
            writers: 4,
            iterations: 1000,
        }
    }
}

impl StressConfig {
    /// Check the fields read by the parity workload.
    pub fn validate_parity(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(FlagError::InvalidConfig("threads must be at least 1".into()));
        }
        if self.rounds == 0 {
            return Err(FlagError::InvalidConfig("rounds must be at least 1".into()));
        }
        Ok(())
    }

    /// Check the fields read by the readers/writers workload.
    pub fn validate_mixed(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(FlagError::InvalidConfig(
                "iterations must be at least 1".into(),
            ));
        }
        if self.readers == 0 && self.writers == 0 {
            return Err(FlagError::InvalidConfig(
                "at least one reader or writer is required".into(),
            ));
        }
        Ok(())
    }

    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        self.validate_parity()?;
        self.validate_mixed()
    }
}

/// Top-level harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Maximum level emitted by the logger
    pub log_level: LevelFilter,

    /// The flag under test
    pub flag: FlagConfig,

    /// Workload sizes
    pub stress: StressConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
            flag: FlagConfig::default(),
            stress: StressConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Read and parse a configuration file.
    ///
    /// Workload sizes are not validated here; each workload checks the
    /// fields it uses before running.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| FlagError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HarnessConfig::from_toml_str("").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.stress.threads, 8);
    }

    #[test]
    fn test_full_config() {
        let config = HarnessConfig::from_toml_str(
            r#"
            log_level = "debug"

            [flag]
            name = "shared"

            [stress]
            threads = 3
            rounds = 2
            readers = 1
            writers = 5
            iterations = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.flag.name.as_deref(), Some("shared"));
        assert_eq!(
            config.stress,
            StressConfig {
                threads: 3,
                rounds: 2,
                readers: 1,
                writers: 5,
                iterations: 10,
            }
        );
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = HarnessConfig::from_toml_str("[stress]\nthreads = 2\n").unwrap();
        assert_eq!(config.stress.threads, 2);
        assert_eq!(config.stress.iterations, 1000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = HarnessConfig::from_toml_str("[flag]\nnmae = \"typo\"\n").unwrap_err();
        assert!(matches!(err, FlagError::ConfigParse(_)));
    }

    #[test]
    fn test_parity_validation() {
        for text in ["[stress]\nthreads = 0\n", "[stress]\nrounds = 0\n"] {
            let config = HarnessConfig::from_toml_str(text).unwrap();
            let err = config.stress.validate_parity().unwrap_err();
            assert!(matches!(err, FlagError::InvalidConfig(_)), "{text}");
            assert!(config.stress.validate_mixed().is_ok(), "{text}");
        }
    }

    #[test]
    fn test_mixed_validation() {
        for text in [
            "[stress]\niterations = 0\n",
            "[stress]\nreaders = 0\nwriters = 0\n",
        ] {
            let config = HarnessConfig::from_toml_str(text).unwrap();
            let err = config.stress.validate_mixed().unwrap_err();
            assert!(matches!(err, FlagError::InvalidConfig(_)), "{text}");
            assert!(config.stress.validate_parity().is_ok(), "{text}");
        }
    }

    #[test]
    fn test_validate_checks_both_workloads() {
        let mut stress = StressConfig::default();
        assert!(stress.validate().is_ok());

        stress.rounds = 0;
        assert!(stress.validate().is_err());

        stress.rounds = 1;
        stress.iterations = 0;
        assert!(stress.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("flagcell-config-{}.toml", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "[flag]\nname = \"from-file\"").unwrap();
        }

        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.flag.name.as_deref(), Some("from-file"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = HarnessConfig::load("/nonexistent/flagcell.toml").unwrap_err();
        assert!(matches!(err, FlagError::ConfigRead { .. }));
    }
}
