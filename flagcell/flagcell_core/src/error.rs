//! Error types for flagcell.
//!
//! Flag operations themselves never fail. Errors come from loading harness
//! configuration and from starting or joining harness worker threads.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout flagcell.
pub type Result<T> = std::result::Result<T, FlagError>;

/// Root error type.
#[derive(Debug, Error)]
pub enum FlagError {
    /// The configuration file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Path that was being read
        path: PathBuf,

        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`HarnessConfig`](crate::HarnessConfig)
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration parsed but holds unusable values
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The OS refused to start a harness thread
    #[error("failed to spawn {role} thread {index}: {source}")]
    SpawnFailed {
        /// Kind of worker being started
        role: String,

        /// Position of the worker that could not be started
        index: usize,

        /// Error returned by the OS
        #[source]
        source: std::io::Error,
    },

    /// A harness thread panicked before finishing its work
    #[error("worker thread panicked: {0}")]
    WorkerPanicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlagError::InvalidConfig("threads must be at least 1".into());
        assert_eq!(err.to_string(), "invalid config: threads must be at least 1");

        let err = FlagError::WorkerPanicked("flipper 3".into());
        assert_eq!(err.to_string(), "worker thread panicked: flipper 3");
    }

    #[test]
    fn test_spawn_failed_display() {
        let err = FlagError::SpawnFailed {
            role: "writer".into(),
            index: 7,
            source: std::io::Error::new(std::io::ErrorKind::WouldBlock, "resource unavailable"),
        };

        assert_eq!(
            err.to_string(),
            "failed to spawn writer thread 7: resource unavailable"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_read_error_keeps_source() {
        let err = FlagError::ConfigRead {
            path: PathBuf::from("missing.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };

        assert!(err.to_string().starts_with("failed to read config missing.toml"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
