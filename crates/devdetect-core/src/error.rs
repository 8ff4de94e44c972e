//! Error types for devdetect

use crate::status::InitStatus;
use crate::types::DataSource;

/// Result type alias using devdetect's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for devdetect operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Data file could not be opened, or the engine could not find it
    #[error("Device data file '{path}' not found.")]
    FileNotFound { path: String },

    /// Short read or malformed content
    #[error("Device data file '{path}' is corrupted.")]
    CorruptData { path: String },

    /// Data file was produced for a different engine version
    #[error("Device data file '{path}' is not correct version.")]
    IncorrectVersion { path: String },

    /// Allocation failed while loading
    #[error("Insufficient memory to load '{path}'")]
    InsufficientMemory { path: String },

    /// Any other engine status on load or reload
    #[error("Device data file '{path}' could not be loaded.")]
    LoadFailed { path: String },

    /// File reload requested after the detector was switched to a memory image
    #[error("no data file is associated with the detector, reload from a path first")]
    NoAssociatedPath,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors outside of data set loading
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

impl Error {
    /// Translate an engine status into a typed error for the given origin.
    ///
    /// `Success` and `NotSet` have no dedicated kind and surface as
    /// [`Error::LoadFailed`]: a caller only translates a status once it has
    /// decided the load did not go through.
    pub fn from_status(status: InitStatus, source: &DataSource) -> Self {
        let path = source.to_string();
        match status {
            InitStatus::InsufficientMemory => Self::InsufficientMemory { path },
            InitStatus::CorruptData => Self::CorruptData { path },
            InitStatus::IncorrectVersion => Self::IncorrectVersion { path },
            InitStatus::FileNotFound => Self::FileNotFound { path },
            InitStatus::Success | InitStatus::NotSet | InitStatus::PointerOutOfBounds => {
                Self::LoadFailed { path }
            }
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error came out of loading a data set
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::CorruptData { .. }
                | Self::IncorrectVersion { .. }
                | Self::InsufficientMemory { .. }
                | Self::LoadFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        let source = DataSource::File(PathBuf::from("/data/HashTrieV34.latest"));

        assert!(matches!(
            Error::from_status(InitStatus::FileNotFound, &source),
            Error::FileNotFound { .. }
        ));
        assert!(matches!(
            Error::from_status(InitStatus::CorruptData, &source),
            Error::CorruptData { .. }
        ));
        assert!(matches!(
            Error::from_status(InitStatus::IncorrectVersion, &source),
            Error::IncorrectVersion { .. }
        ));
        assert!(matches!(
            Error::from_status(InitStatus::InsufficientMemory, &source),
            Error::InsufficientMemory { .. }
        ));
        assert!(matches!(
            Error::from_status(InitStatus::NotSet, &source),
            Error::LoadFailed { .. }
        ));
        assert!(matches!(
            Error::from_status(InitStatus::PointerOutOfBounds, &source),
            Error::LoadFailed { .. }
        ));
    }

    #[test]
    fn test_messages_carry_path() {
        let source = DataSource::File(PathBuf::from("missing.trie"));
        let err = Error::from_status(InitStatus::FileNotFound, &source);
        assert_eq!(err.to_string(), "Device data file 'missing.trie' not found.");

        let err = Error::from_status(InitStatus::InsufficientMemory, &DataSource::Memory);
        assert_eq!(err.to_string(), "Insufficient memory to load 'memory-image'");
    }

    #[test]
    fn test_is_load_error() {
        assert!(Error::from_status(InitStatus::CorruptData, &DataSource::Memory).is_load_error());
        assert!(!Error::NoAssociatedPath.is_load_error());
        assert!(!Error::config("bad").is_load_error());
    }
}
