//! Status codes reported by trie engines while initializing a data set

use std::fmt;

/// Outcome of a data set initialization inside a trie engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitStatus {
    /// Data set is ready
    Success,
    /// Memory could not be allocated
    InsufficientMemory,
    /// Content is truncated or malformed
    CorruptData,
    /// Content was written for another format version
    IncorrectVersion,
    /// Source file does not exist or cannot be opened
    FileNotFound,
    /// Engine did not report a specific reason
    NotSet,
    /// An offset inside the data points outside the image
    PointerOutOfBounds,
}

impl InitStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::InsufficientMemory => "insufficient_memory",
            Self::CorruptData => "corrupt_data",
            Self::IncorrectVersion => "incorrect_version",
            Self::FileNotFound => "file_not_found",
            Self::NotSet => "not_set",
            Self::PointerOutOfBounds => "pointer_out_of_bounds",
        }
    }
}

impl fmt::Display for InitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<std::io::ErrorKind> for InitStatus {
    fn from(kind: std::io::ErrorKind) -> Self {
        match kind {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                Self::FileNotFound
            }
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData => {
                Self::CorruptData
            }
            std::io::ErrorKind::OutOfMemory => Self::InsufficientMemory,
            _ => Self::NotSet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_io_kind_conversion() {
        assert_eq!(InitStatus::from(ErrorKind::NotFound), InitStatus::FileNotFound);
        assert_eq!(InitStatus::from(ErrorKind::UnexpectedEof), InitStatus::CorruptData);
        assert_eq!(InitStatus::from(ErrorKind::OutOfMemory), InitStatus::InsufficientMemory);
        assert_eq!(InitStatus::from(ErrorKind::Interrupted), InitStatus::NotSet);
    }

    #[test]
    fn test_success() {
        assert!(InitStatus::Success.is_success());
        assert!(!InitStatus::CorruptData.is_success());
        assert_eq!(InitStatus::IncorrectVersion.to_string(), "incorrect_version");
    }
}
