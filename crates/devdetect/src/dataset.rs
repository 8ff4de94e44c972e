//! Installed data sets and their lifecycle accounting

use crate::loader::StagedDataSet;
use devdetect_core::DataSource;
use devdetect_trie::TrieDataSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// One immutable generation of detection data, shared by every query
/// running against it.
pub struct DataSet {
    trie: Box<dyn TrieDataSet>,
    source: DataSource,
    generation: u64,
    tracker: Arc<DataSetTracker>,
}

impl DataSet {
    /// Wrap a staged data set. It is counted as installed only once the
    /// provider has published it.
    pub(crate) fn new(
        staged: StagedDataSet,
        generation: u64,
        tracker: Arc<DataSetTracker>,
    ) -> Self {
        Self {
            trie: staged.trie,
            source: staged.source,
            generation,
            tracker,
        }
    }

    /// Engine view used to answer queries
    pub fn trie(&self) -> &dyn TrieDataSet {
        self.trie.as_ref()
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Position in the provider's sequence of installed data sets, starting at 1
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image_len(&self) -> usize {
        self.trie.image_len()
    }
}

impl Drop for DataSet {
    fn drop(&mut self) {
        self.tracker.destroyed.fetch_add(1, Ordering::AcqRel);
        debug!(
            "Destroyed data set generation {} from {}",
            self.generation, self.source
        );
    }
}

impl std::fmt::Debug for DataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSet")
            .field("source", &self.source)
            .field("generation", &self.generation)
            .field("image_len", &self.trie.image_len())
            .finish()
    }
}

/// Counts data sets installed into and destroyed by one provider
#[derive(Debug, Default)]
pub struct DataSetTracker {
    installed: AtomicU64,
    destroyed: AtomicU64,
}

impl DataSetTracker {
    pub(crate) fn record_installed(&self) {
        self.installed.fetch_add(1, Ordering::AcqRel);
    }

    pub fn installed(&self) -> u64 {
        self.installed.load(Ordering::Acquire)
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Data sets not yet destroyed, the current one included
    pub fn live(&self) -> u64 {
        self.installed().saturating_sub(self.destroyed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_from_image, DataSetImage};
    use devdetect_core::DETECTION_PROPERTIES;
    use devdetect_trie::{DataSetBuilder, HashTrieEngine};

    fn staged() -> StagedDataSet {
        let image = DataSetBuilder::new(["DeviceType"])
            .profile("any", [("DeviceType", "Desktop")])
            .default_profile("any")
            .build()
            .unwrap();
        load_from_image(
            &HashTrieEngine::new(),
            DataSetImage::from_bytes(image),
            &DETECTION_PROPERTIES,
        )
        .unwrap()
    }

    #[test]
    fn test_wrapping_does_not_count_as_installed() {
        let tracker = Arc::new(DataSetTracker::default());
        let data_set = DataSet::new(staged(), 7, Arc::clone(&tracker));
        assert_eq!(data_set.generation(), 7);
        assert_eq!(tracker.installed(), 0);

        tracker.record_installed();
        assert_eq!(tracker.live(), 1);

        drop(data_set);
        assert_eq!(tracker.installed(), 1);
        assert_eq!(tracker.destroyed(), 1);
        assert_eq!(tracker.live(), 0);
    }
}
