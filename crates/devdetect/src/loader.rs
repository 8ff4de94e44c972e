//! Loading data files into staged data sets

use devdetect_core::{DataSource, Error, InitStatus, Result};
use devdetect_trie::{TrieDataSet, TrieEngine};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// A data file held in memory, not yet handed to an engine
#[derive(Debug, Clone)]
pub struct DataSetImage {
    buffer: Vec<u8>,
    source: DataSource,
}

impl DataSetImage {
    /// Read `path` fully into memory.
    ///
    /// The length comes from seeking the open handle rather than a separate
    /// stat, so it always describes the file actually being read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = DataSource::File(path.to_path_buf());
        let fail = |status: InitStatus| Error::from_status(status, &source);

        let mut file = File::open(path).map_err(|_| fail(InitStatus::FileNotFound))?;

        let len = file
            .seek(SeekFrom::End(0))
            .map_err(|_| fail(InitStatus::NotSet))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|_| fail(InitStatus::NotSet))?;

        let len = usize::try_from(len).map_err(|_| fail(InitStatus::InsufficientMemory))?;
        let capacity = len
            .checked_add(1)
            .ok_or_else(|| fail(InitStatus::InsufficientMemory))?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| fail(InitStatus::InsufficientMemory))?;
        buffer.resize(len, 0);

        file.read_exact(&mut buffer)
            .map_err(|_| fail(InitStatus::CorruptData))?;

        debug!("Read {} bytes from {}", len, path.display());

        Ok(Self { buffer, source })
    }

    /// Wrap an image the caller already holds
    pub fn from_bytes(buffer: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: buffer.into(),
            source: DataSource::Memory,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

/// A data set the engine accepted, waiting to be installed in a provider
pub struct StagedDataSet {
    pub(crate) trie: Box<dyn TrieDataSet>,
    pub(crate) source: DataSource,
}

impl StagedDataSet {
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn image_len(&self) -> usize {
        self.trie.image_len()
    }
}

impl std::fmt::Debug for StagedDataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedDataSet")
            .field("source", &self.source)
            .field("image_len", &self.trie.image_len())
            .finish()
    }
}

/// Read `path` into memory and initialize the engine over the buffer.
pub fn load_from_file(
    engine: &dyn TrieEngine,
    path: impl AsRef<Path>,
    properties: &[&str],
) -> Result<StagedDataSet> {
    let image = DataSetImage::from_file(path)?;
    load_from_image(engine, image, properties)
}

/// Let the engine read `path` with its own file reader.
pub fn load_via_engine(
    engine: &dyn TrieEngine,
    path: impl AsRef<Path>,
    properties: &[&str],
) -> Result<StagedDataSet> {
    let source = DataSource::File(path.as_ref().to_path_buf());
    let trie = engine
        .init_from_file(path.as_ref(), properties)
        .map_err(|status| Error::from_status(status, &source))?;

    Ok(StagedDataSet { trie, source })
}

/// Hand an in-memory image to the engine. The buffer moves into the engine.
pub fn load_from_image(
    engine: &dyn TrieEngine,
    image: DataSetImage,
    properties: &[&str],
) -> Result<StagedDataSet> {
    let DataSetImage { buffer, source } = image;
    let trie = engine
        .init_from_memory(buffer, properties)
        .map_err(|status| Error::from_status(status, &source))?;

    Ok(StagedDataSet { trie, source })
}
