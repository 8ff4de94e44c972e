//! Reference engine over hash-trie data files

use crate::engine::{DeviceOffset, DeviceOffsets, TrieDataSet, TrieEngine};
use crate::format::Layout;
use aho_corasick::AhoCorasick;
use bytes::Bytes;
use devdetect_core::InitStatus;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// Engine reading the hash-trie format produced by [`crate::DataSetBuilder`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HashTrieEngine;

impl HashTrieEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TrieEngine for HashTrieEngine {
    fn init_from_file(
        &self,
        path: &Path,
        properties: &[&str],
    ) -> Result<Box<dyn TrieDataSet>, InitStatus> {
        let image = std::fs::read(path).map_err(|e| InitStatus::from(e.kind()))?;
        debug!("Read {} bytes from {}", image.len(), path.display());
        self.init_from_memory(image, properties)
    }

    fn init_from_memory(
        &self,
        image: Vec<u8>,
        properties: &[&str],
    ) -> Result<Box<dyn TrieDataSet>, InitStatus> {
        Ok(Box::new(HashTrieDataSet::new(Bytes::from(image), properties)?))
    }

    fn name(&self) -> &str {
        "hash-trie"
    }
}

/// Data set answering lookups directly out of the owned image
pub struct HashTrieDataSet {
    image: Bytes,
    properties: Vec<String>,
    /// Required property index -> column in `values`
    required: Vec<usize>,
    values: Vec<Option<Range<usize>>>,
    default_profile: Option<u32>,
    matcher: AhoCorasick,
    pattern_profiles: Vec<u32>,
}

impl HashTrieDataSet {
    fn new(image: Bytes, properties: &[&str]) -> Result<Self, InitStatus> {
        let layout = Layout::parse(&image)?;

        let required = properties
            .iter()
            .filter_map(|name| layout.properties.iter().position(|p| p == name))
            .collect();

        let matcher = AhoCorasick::new(layout.patterns.iter().map(|range| &image[range.clone()]))
            .map_err(|_| InitStatus::InsufficientMemory)?;

        debug!(
            "Initialized hash-trie data set: {} properties, {} profiles, {} patterns",
            layout.properties.len(),
            layout.profile_count,
            layout.pattern_profiles.len()
        );

        Ok(Self {
            properties: layout.properties,
            required,
            values: layout.values,
            default_profile: layout.default_profile,
            matcher,
            pattern_profiles: layout.pattern_profiles,
            image,
        })
    }

    /// Profile for a user agent: the lowest-indexed pattern occurring anywhere
    /// in it, otherwise the default profile.
    fn resolve(&self, user_agent: &str) -> Option<u32> {
        self.matcher
            .find_overlapping_iter(user_agent)
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|pattern| self.pattern_profiles[pattern])
            .or(self.default_profile)
    }
}

impl TrieDataSet for HashTrieDataSet {
    fn set_device_offset(&self, user_agent: &str, index: usize, offsets: &mut DeviceOffsets) {
        offsets.set(
            index,
            DeviceOffset {
                profile: self.resolve(user_agent),
            },
        );
    }

    fn required_property_index(&self, name: &str) -> Option<usize> {
        self.required
            .iter()
            .position(|&column| self.properties[column] == name)
    }

    fn required_property_count(&self) -> usize {
        self.required.len()
    }

    fn value<'a>(&'a self, offsets: &DeviceOffsets, property_index: usize) -> Option<&'a str> {
        let profile = offsets.first_resolved()? as usize;
        let column = *self.required.get(property_index)?;
        let range = self
            .values
            .get(profile * self.properties.len() + column)?
            .clone()?;
        std::str::from_utf8(&self.image[range]).ok()
    }

    fn image_len(&self) -> usize {
        self.image.len()
    }
}
