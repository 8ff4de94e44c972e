//! Core types for device classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Property holding the device form factor, e.g. `Desktop` or `SmartPhone`
pub const DEVICE_TYPE: &str = "DeviceType";

/// Property set to `True` for phones and other handhelds
pub const IS_MOBILE: &str = "IsMobile";

/// Property set to `True` for tablets
pub const IS_TABLET: &str = "IsTablet";

/// Properties every detector requests from its engine, in request order
pub const DETECTION_PROPERTIES: [&str; 3] = [IS_TABLET, IS_MOBILE, DEVICE_TYPE];

const TRUE_VALUE: &str = "True";
const DESKTOP_VALUE: &str = "Desktop";

/// Coarse device category returned by detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceClass {
    /// Unknown or any other device than desktop, mobile or tablet
    #[default]
    Unknown,
    Desktop,
    /// Cell phone
    Mobile,
    Tablet,
}

impl DeviceClass {
    /// Apply the classification table to raw property values.
    ///
    /// First match wins: a tablet flag beats a mobile flag, which beats the
    /// device type. Comparison is byte-exact.
    pub fn from_properties(
        is_tablet: Option<&str>,
        is_mobile: Option<&str>,
        device_type: Option<&str>,
    ) -> Self {
        if is_tablet == Some(TRUE_VALUE) {
            Self::Tablet
        } else if is_mobile == Some(TRUE_VALUE) {
            Self::Mobile
        } else if device_type == Some(DESKTOP_VALUE) {
            Self::Desktop
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Desktop => "DESKTOP",
            Self::Mobile => "MOBILE",
            Self::Tablet => "TABLET",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a data set's bytes came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Loaded from a file on disk
    File(PathBuf),
    /// Supplied by the caller as an in-memory image
    Memory,
}

impl DataSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Memory => None,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str("memory-image"),
        }
    }
}
