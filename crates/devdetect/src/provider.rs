//! Hot-swappable holder of the active data set
//!
//! Readers take a reference-counted handle on whatever data set is current
//! and keep it until their query ends. A reload loads the replacement first,
//! then publishes it with a single atomic pointer swap. The data set it
//! replaces is retired and destroyed when its last handle is dropped.
//!
//! Under very frequent reloads with long-running readers, retired data sets
//! pile up until their readers finish. [`Provider::with_quiescence`] trades
//! reader latency for a bound of one live data set.

use crate::dataset::{DataSet, DataSetTracker};
use crate::loader::{self, DataSetImage, StagedDataSet};
use arc_swap::ArcSwap;
use devdetect_core::{DataSource, Error, Result};
use devdetect_trie::{DeviceOffsets, TrieEngine};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Owns the current data set and swaps it on reload
pub struct Provider {
    engine: Arc<dyn TrieEngine>,
    properties: Vec<String>,
    current: ArcSwap<DataSet>,
    /// Serializes reloads and holds the path file reloads read from
    reload_path: Mutex<Option<PathBuf>>,
    tracker: Arc<DataSetTracker>,
    quiesce: Option<RwLock<()>>,
}

impl Provider {
    /// Install `initial` as generation 1.
    ///
    /// File reloads use the initial data set's path until a memory reload
    /// clears it.
    pub fn new(engine: Arc<dyn TrieEngine>, properties: &[&str], initial: StagedDataSet) -> Self {
        let tracker = Arc::new(DataSetTracker::default());
        let reload_path = initial.source().path().map(Path::to_path_buf);
        let current = DataSet::new(initial, 1, Arc::clone(&tracker));
        tracker.record_installed();

        Self {
            engine,
            properties: properties.iter().map(|p| p.to_string()).collect(),
            current: ArcSwap::from_pointee(current),
            reload_path: Mutex::new(reload_path),
            tracker,
            quiesce: None,
        }
    }

    /// Make every reload wait for in-flight readers and destroy the retired
    /// data set before returning. Readers block while a reload publishes.
    pub fn with_quiescence(mut self, enabled: bool) -> Self {
        self.quiesce = enabled.then(|| RwLock::new(()));
        self
    }

    /// Take a handle on the current data set.
    ///
    /// Never waits on a reload unless quiescence is enabled. Handles must not
    /// be nested on one thread when it is.
    pub fn acquire(&self) -> ActiveHandle<'_> {
        let quiesce = self.quiesce.as_ref().map(|lock| lock.read());
        ActiveHandle {
            offsets: DeviceOffsets::new(1),
            data_set: self.current.load_full(),
            _quiesce: quiesce,
        }
    }

    /// Reload from the associated file path.
    pub fn reload_from_file(&self) -> Result<()> {
        let mut reload_path = self.reload_path.lock();
        let path = reload_path.clone().ok_or(Error::NoAssociatedPath)?;
        self.reload_file(&mut reload_path, path)
    }

    /// Reload from `path` and associate it with future file reloads.
    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut reload_path = self.reload_path.lock();
        self.reload_file(&mut reload_path, path.as_ref().to_path_buf())
    }

    /// Reload from a memory image. Clears the associated path on success.
    pub fn reload_from_memory(&self, image: DataSetImage) -> Result<()> {
        let mut reload_path = self.reload_path.lock();
        let source = image.source().clone();

        let staged = self.load("memory", &source, |engine, properties| {
            loader::load_from_image(engine, image, properties)
        })?;
        self.publish(staged);
        *reload_path = None;
        Ok(())
    }

    /// Path file reloads read from, if any
    pub fn associated_path(&self) -> Option<PathBuf> {
        self.reload_path.lock().clone()
    }

    /// Generation of the current data set
    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    pub fn stats(&self) -> ProviderStats {
        let installed = self.tracker.installed();
        let destroyed = self.tracker.destroyed();
        ProviderStats {
            generation: self.generation(),
            installed,
            destroyed,
            retained: installed.saturating_sub(destroyed).saturating_sub(1),
        }
    }

    /// Lifecycle counters, shared with every data set this provider installed.
    /// Outlives the provider.
    pub fn tracker(&self) -> Arc<DataSetTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    fn reload_file(&self, reload_path: &mut Option<PathBuf>, path: PathBuf) -> Result<()> {
        let staged = self.load("file", &DataSource::File(path.clone()), |engine, properties| {
            loader::load_via_engine(engine, &path, properties)
        })?;
        self.publish(staged);
        *reload_path = Some(path);
        Ok(())
    }

    fn load<F>(&self, kind: &'static str, source: &DataSource, load: F) -> Result<StagedDataSet>
    where
        F: FnOnce(&dyn TrieEngine, &[&str]) -> Result<StagedDataSet>,
    {
        let start = Instant::now();
        let properties: Vec<&str> = self.properties.iter().map(String::as_str).collect();

        let result = load(self.engine.as_ref(), &properties);
        metrics::histogram!("devdetect_reload_duration_us", "source" => kind)
            .record(start.elapsed().as_micros() as f64);

        match &result {
            Ok(_) => {
                metrics::counter!(
                    "devdetect_reloads_total",
                    "source" => kind,
                    "outcome" => "success"
                )
                .increment(1);
            }
            Err(e) => {
                metrics::counter!(
                    "devdetect_reloads_total",
                    "source" => kind,
                    "outcome" => "failure"
                )
                .increment(1);
                warn!(
                    "Reload from {} failed, keeping generation {}: {}",
                    source,
                    self.generation(),
                    e
                );
            }
        }

        result
    }

    /// Swap `staged` in as current. Caller holds the reload lock.
    fn publish(&self, staged: StagedDataSet) {
        let generation = self.generation() + 1;
        let next = Arc::new(DataSet::new(staged, generation, Arc::clone(&self.tracker)));
        let (source, image_len) = (next.source().to_string(), next.image_len());

        let barrier = self.quiesce.as_ref().map(|lock| lock.write());
        let retired = self.current.swap(next);
        // count the new set before the retired one can be destroyed
        self.tracker.record_installed();
        drop(retired);
        drop(barrier);

        let stats = self.stats();
        metrics::gauge!("devdetect_retained_datasets").set(stats.retained as f64);
        info!(
            "Installed data set generation {} from {} ({} bytes, {} retained)",
            generation, source, image_len, stats.retained
        );
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("engine", &self.engine.name())
            .field("properties", &self.properties)
            .field("generation", &self.generation())
            .field("quiesce", &self.quiesce.is_some())
            .finish()
    }
}

/// Lifecycle snapshot of a provider. The counters are read separately, so
/// the snapshot is exact only while no reload is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderStats {
    /// Generation of the current data set
    pub generation: u64,
    /// Data sets ever installed, the initial one included
    pub installed: u64,
    /// Data sets whose last handle has been released
    pub destroyed: u64,
    /// Retired data sets still held by in-flight queries
    pub retained: u64,
}

/// A query's hold on one data set generation.
///
/// The data set cannot be destroyed while the handle exists. Dropping the
/// handle releases the offsets, then the data set reference.
pub struct ActiveHandle<'p> {
    offsets: DeviceOffsets,
    data_set: Arc<DataSet>,
    _quiesce: Option<RwLockReadGuard<'p, ()>>,
}

impl ActiveHandle<'_> {
    pub fn data_set(&self) -> &DataSet {
        &self.data_set
    }

    pub fn generation(&self) -> u64 {
        self.data_set.generation()
    }

    /// Resolve a user agent into this handle's offsets
    pub fn set_user_agent(&mut self, user_agent: &str) {
        self.data_set
            .trie()
            .set_device_offset(user_agent, 0, &mut self.offsets);
    }

    /// Value of a required property for the resolved user agent.
    /// `None` when the property is not carried or has no value.
    pub fn property(&self, name: &str) -> Option<&str> {
        let trie = self.data_set.trie();
        let index = trie.required_property_index(name)?;
        if index >= trie.required_property_count() {
            return None;
        }
        trie.value(&self.offsets, index)
    }
}
