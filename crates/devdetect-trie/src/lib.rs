//! devdetect Trie
//!
//! The engine side of device detection: something that turns a vendor data
//! file into a data set able to resolve a User-Agent to property values.
//!
//! - [`TrieEngine`] / [`TrieDataSet`] describe what the detector needs from an engine
//! - [`HashTrieEngine`] is the bundled engine for the hash-trie file format
//! - [`DataSetBuilder`] writes hash-trie files from a YAML [`DataSetSource`]

pub mod builder;
pub mod engine;
pub mod format;
pub mod hash_trie;

pub use builder::{DataSetBuilder, DataSetSource, PatternSpec, ProfileSpec};
pub use engine::{DeviceOffset, DeviceOffsets, TrieDataSet, TrieEngine};
pub use format::FORMAT_VERSION;
pub use hash_trie::{HashTrieDataSet, HashTrieEngine};
