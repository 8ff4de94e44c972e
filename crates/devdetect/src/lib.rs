//! devdetect
//!
//! Thread-safe device-class detection from HTTP User-Agent strings, backed by
//! a vendor trie data file that can be swapped at runtime.
//!
//! - [`Detector`] answers `detect` on many threads at once
//! - [`Provider`] holds the current [`DataSet`] and replaces it atomically on reload
//! - [`DataSetImage`] reads a data file into memory ahead of a memory reload
//!
//! Queries never wait on a reload: each one pins the data set generation it
//! started with, and a retired generation is freed once its last query ends.

pub mod config;
pub mod dataset;
pub mod detector;
pub mod loader;
pub mod provider;

pub use config::DetectorConfig;
pub use dataset::{DataSet, DataSetTracker};
pub use detector::Detector;
pub use devdetect_core::{DataSource, DeviceClass, Error, InitStatus, Result};
pub use loader::{DataSetImage, StagedDataSet};
pub use provider::{ActiveHandle, Provider, ProviderStats};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::DetectorConfig;
    pub use crate::detector::Detector;
    pub use crate::loader::DataSetImage;
    pub use devdetect_core::{DeviceClass, Error, Result};
}
