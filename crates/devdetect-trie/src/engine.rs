//! Trie engine trait and per-query offsets

use devdetect_core::InitStatus;
use smallvec::{smallvec, SmallVec};
use std::path::Path;

/// A trie engine turns a vendor data file into a queryable data set.
///
/// Implementations own the image they are given: `init_from_memory` takes the
/// buffer by value and the returned data set keeps it alive until it is dropped.
pub trait TrieEngine: Send + Sync {
    /// Read `path` with the engine's own reader and initialize a data set
    /// answering the given properties.
    fn init_from_file(
        &self,
        path: &Path,
        properties: &[&str],
    ) -> Result<Box<dyn TrieDataSet>, InitStatus>;

    /// Initialize a data set over an image already in memory.
    fn init_from_memory(
        &self,
        image: Vec<u8>,
        properties: &[&str],
    ) -> Result<Box<dyn TrieDataSet>, InitStatus>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// An initialized, immutable data set.
///
/// All methods take `&self`; a data set is shared by every reader that
/// acquired it.
pub trait TrieDataSet: Send + Sync {
    /// Resolve `user_agent` and store the result in slot `index` of `offsets`.
    fn set_device_offset(&self, user_agent: &str, index: usize, offsets: &mut DeviceOffsets);

    /// Position of `name` among the required properties, `None` if the data
    /// set does not carry it.
    fn required_property_index(&self, name: &str) -> Option<usize>;

    /// Number of required properties the data set can answer
    fn required_property_count(&self) -> usize;

    /// Value of a required property for the device resolved into `offsets`.
    fn value<'a>(&'a self, offsets: &DeviceOffsets, property_index: usize) -> Option<&'a str>;

    /// Size of the backing image in bytes
    fn image_len(&self) -> usize;
}

/// Result of resolving one header value against a data set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceOffset {
    /// Profile the header resolved to, if any
    pub profile: Option<u32>,
}

/// Scratch space for one query. A single-header query stays inline.
#[derive(Debug, Clone, Default)]
pub struct DeviceOffsets {
    offsets: SmallVec<[DeviceOffset; 1]>,
}

impl DeviceOffsets {
    /// Create offsets with `size` unresolved slots
    pub fn new(size: usize) -> Self {
        Self {
            offsets: smallvec![DeviceOffset::default(); size],
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Store `offset` in slot `index`, growing the slots if needed
    pub fn set(&mut self, index: usize, offset: DeviceOffset) {
        if index >= self.offsets.len() {
            self.offsets.resize(index + 1, DeviceOffset::default());
        }
        self.offsets[index] = offset;
    }

    pub fn get(&self, index: usize) -> Option<&DeviceOffset> {
        self.offsets.get(index)
    }

    /// First slot that resolved to a profile
    pub fn first_resolved(&self) -> Option<u32> {
        self.offsets.iter().find_map(|offset| offset.profile)
    }

    /// Mark every slot unresolved again
    pub fn clear(&mut self) {
        self.offsets.fill(DeviceOffset::default());
    }
}
