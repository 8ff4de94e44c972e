//! Fixtures shared by the integration tests

#![allow(dead_code)]

use devdetect_trie::{DataSetBuilder, DataSetSource};
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// User-Agent string of an iPhone mobile device
pub const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 7_1 like Mac OS X) AppleWebKit/537.51.2 (KHTML, like Gecko) Version/7.0 Mobile/11D167 Safari/9537.53";

/// User-Agent string of Firefox 41 on desktop
pub const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 6.3; WOW64; rv:41.0) Gecko/20100101 Firefox/41.0";

/// User-Agent string of an iPad
pub const TABLET_UA: &str = "Mozilla/5.0 (iPad; CPU OS 12_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148";

pub fn devices_source() -> DataSetSource {
    DataSetSource::from_yaml(include_str!("../../../../data/devices.yaml"))
        .expect("bundled devices.yaml parses")
}

pub fn devices_image() -> Vec<u8> {
    DataSetBuilder::from_source(&devices_source())
        .build()
        .expect("bundled devices.yaml builds")
}

/// A data file that reports every device as a desktop
pub fn all_desktop_image() -> Vec<u8> {
    DataSetBuilder::new(["DeviceType", "IsMobile", "IsTablet"])
        .profile(
            "desktop",
            [("DeviceType", "Desktop"), ("IsMobile", "False"), ("IsTablet", "False")],
        )
        .default_profile("desktop")
        .build()
        .expect("desktop image builds")
}

pub fn write_devices(dir: &Path) -> PathBuf {
    let path = dir.join("devices.trie");
    std::fs::write(&path, devices_image()).expect("write devices.trie");
    path
}

/// Route crate logs through the test harness so they show up on failure.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("devdetect=debug")
        .with_test_writer()
        .try_init();
}

/// Run `f` with a subscriber that records every event at debug and above,
/// returning its result and the formatted log output.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tracing::callsite::rebuild_interest_cache();
        f()
    });
    (result, buffer.contents())
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
