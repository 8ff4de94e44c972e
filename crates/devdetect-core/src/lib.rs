//! devdetect Core
//!
//! Core types, traits, and utilities shared across devdetect components.
//!
//! This crate provides:
//! - The [`DeviceClass`] result type and the property-to-class decision table
//! - Error types and result handling
//! - Engine initialization status codes and their translation into errors

pub mod error;
pub mod status;
pub mod types;

pub use error::{Error, Result};
pub use status::InitStatus;
pub use types::{DataSource, DeviceClass, DETECTION_PROPERTIES, DEVICE_TYPE, IS_MOBILE, IS_TABLET};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::status::InitStatus;
    pub use crate::types::{DataSource, DeviceClass};
}
