//! Errors raised while persisting terrain settings.

use std::path::PathBuf;

/// Failure to read, write or decode `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read terrain settings from {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write terrain settings to {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid settings document.
    #[error("malformed terrain settings in {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("cannot encode terrain settings: {0}")]
    SerializeError(#[source] ron::Error),
}
