//! Device detection facade

use crate::config::DetectorConfig;
use crate::loader::{self, DataSetImage};
use crate::provider::{Provider, ProviderStats};
use devdetect_core::{
    DeviceClass, Result, DETECTION_PROPERTIES, DEVICE_TYPE, IS_MOBILE, IS_TABLET,
};
use devdetect_trie::{HashTrieEngine, TrieEngine};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Classifies User-Agent strings as desktop, mobile or tablet.
///
/// `detect` may be called from any number of threads while one thread
/// reloads. Share it by reference (scoped threads) or through an `Arc`.
#[derive(Debug)]
pub struct Detector {
    provider: Provider,
}

impl Detector {
    /// Create a detector over the hash-trie data file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_engine(path, Arc::new(HashTrieEngine::new()), &DetectorConfig::default())
    }

    /// Create a detector from configuration
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        Self::with_engine(&config.data_file, Arc::new(HashTrieEngine::new()), config)
    }

    /// Create a detector backed by a specific engine
    pub fn with_engine(
        path: impl AsRef<Path>,
        engine: Arc<dyn TrieEngine>,
        config: &DetectorConfig,
    ) -> Result<Self> {
        let initial =
            loader::load_from_file(engine.as_ref(), path.as_ref(), &DETECTION_PROPERTIES)?;
        info!(
            "Loaded {} ({} bytes) with {} engine",
            initial.source(),
            initial.image_len(),
            engine.name()
        );

        let provider = Provider::new(engine, &DETECTION_PROPERTIES, initial)
            .with_quiescence(config.quiesce_readers_on_reload);

        Ok(Self { provider })
    }

    /// Reload the data file the detector is associated with.
    ///
    /// On error the previous data keeps serving; the caller decides whether
    /// the failure is fatal.
    pub fn reload(&self) -> Result<()> {
        self.provider.reload_from_file()
    }

    /// Reload from `path` and associate the detector with it.
    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.provider.reload_from_path(path)
    }

    /// Reload from a preloaded image.
    ///
    /// Afterwards [`Detector::reload`] fails with `NoAssociatedPath` until
    /// [`Detector::reload_from_path`] succeeds.
    pub fn reload_from_memory(&self, image: DataSetImage) -> Result<()> {
        self.provider.reload_from_memory(image)
    }

    /// Detect the device class of a User-Agent. Thread safe.
    pub fn detect(&self, user_agent: &str) -> DeviceClass {
        let mut handle = self.provider.acquire();
        handle.set_user_agent(user_agent);

        let class = DeviceClass::from_properties(
            handle.property(IS_TABLET),
            handle.property(IS_MOBILE),
            handle.property(DEVICE_TYPE),
        );

        metrics::counter!("devdetect_detections_total", "class" => class.as_str()).increment(1);
        class
    }

    /// Detect every User-Agent in order
    pub fn detect_all<I, S>(&self, user_agents: I) -> Vec<DeviceClass>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        user_agents
            .into_iter()
            .map(|ua| self.detect(ua.as_ref()))
            .collect()
    }

    /// Generation of the data set currently answering queries
    pub fn generation(&self) -> u64 {
        self.provider.generation()
    }

    pub fn stats(&self) -> ProviderStats {
        self.provider.stats()
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}
