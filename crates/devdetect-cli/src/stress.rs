//! Multi-reader detection with periodic reloads

use devdetect::{Detector, ProviderStats};
use devdetect_core::DeviceClass;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// User agents every reader cycles through, with the class each must get
pub const STRESS_CASES: [(&str, DeviceClass); 3] = [
    (
        "Mozilla/5.0 (iPhone; CPU iPhone OS 7_1 like Mac OS X) AppleWebKit/537.51.2 (KHTML, like Gecko) Version/7.0 Mobile/11D167 Safari/9537.53",
        DeviceClass::Mobile,
    ),
    (
        "Mozilla/5.0 (Windows NT 6.3; WOW64; rv:41.0) Gecko/20100101 Firefox/41.0",
        DeviceClass::Desktop,
    ),
    (
        "Mozilla/5.0 (iPad; CPU OS 12_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148",
        DeviceClass::Tablet,
    ),
];

#[derive(Debug, Clone)]
pub struct StressOptions {
    pub threads: usize,
    pub loops: u64,
    pub reload_interval: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub detections: u64,
    pub misclassified: u64,
    pub reloads: u64,
    pub failed_reloads: u64,
    pub generation: u64,
    pub installed: u64,
    pub destroyed: u64,
    pub retained: u64,
    pub elapsed_ms: u128,
}

impl StressReport {
    fn new(
        detections: u64,
        misclassified: u64,
        reloads: u64,
        failed_reloads: u64,
        stats: ProviderStats,
        elapsed: Duration,
    ) -> Self {
        Self {
            detections,
            misclassified,
            reloads,
            failed_reloads,
            generation: stats.generation,
            installed: stats.installed,
            destroyed: stats.destroyed,
            retained: stats.retained,
            elapsed_ms: elapsed.as_millis(),
        }
    }

    pub fn passed(&self) -> bool {
        self.misclassified == 0 && self.retained == 0
    }
}

/// Run the readers to completion, reloading from the detector's data file
/// every `reload_interval` until the last one finishes.
///
/// A failed reload is logged and counted; the readers keep using the data
/// set they already have.
pub fn run(detector: &Detector, options: &StressOptions) -> StressReport {
    let misclassified = AtomicU64::new(0);
    let finished = AtomicUsize::new(0);
    let mut reloads = 0u64;
    let mut failed_reloads = 0u64;
    let start = Instant::now();

    thread::scope(|scope| {
        for reader in 0..options.threads {
            let misclassified = &misclassified;
            let finished = &finished;
            scope.spawn(move || {
                let mut wrong = 0u64;
                for i in 0..options.loops {
                    let (ua, expected) = STRESS_CASES[(reader + i as usize) % STRESS_CASES.len()];
                    if detector.detect(ua) != expected {
                        wrong += 1;
                    }
                }
                misclassified.fetch_add(wrong, Ordering::Relaxed);
                finished.fetch_add(1, Ordering::Release);
                debug!("Reader {} finished with {} misclassifications", reader, wrong);
            });
        }

        while finished.load(Ordering::Acquire) < options.threads {
            thread::sleep(options.reload_interval);
            match detector.reload() {
                Ok(()) => reloads += 1,
                Err(e) => {
                    failed_reloads += 1;
                    warn!("Reload failed: {}", e);
                }
            }
        }
    });

    StressReport::new(
        options.threads as u64 * options.loops,
        misclassified.load(Ordering::Relaxed),
        reloads,
        failed_reloads,
        detector.stats(),
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use devdetect_trie::DataSetBuilder;

    fn write_data_file(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("devices.trie");
        DataSetBuilder::new(["DeviceType", "IsMobile", "IsTablet"])
            .profile(
                "ipad",
                [("DeviceType", "Tablet"), ("IsMobile", "True"), ("IsTablet", "True")],
            )
            .profile(
                "iphone",
                [("DeviceType", "SmartPhone"), ("IsMobile", "True"), ("IsTablet", "False")],
            )
            .profile(
                "desktop",
                [("DeviceType", "Desktop"), ("IsMobile", "False"), ("IsTablet", "False")],
            )
            .pattern("iPad", "ipad")
            .pattern("iPhone", "iphone")
            .pattern("Windows NT", "desktop")
            .write_to(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_small_run_passes() {
        let dir = tempfile::tempdir().unwrap();
        let detector = Detector::new(write_data_file(dir.path())).unwrap();

        let report = run(
            &detector,
            &StressOptions {
                threads: 4,
                loops: 5_000,
                reload_interval: Duration::from_millis(1),
            },
        );

        assert!(report.passed(), "{:?}", report);
        assert_eq!(report.detections, 20_000);
        assert_eq!(report.failed_reloads, 0);
        assert_eq!(report.generation, report.reloads + 1);
    }

    #[test]
    fn test_failed_reloads_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_data_file(dir.path());
        let detector = Detector::new(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let report = run(
            &detector,
            &StressOptions {
                threads: 2,
                loops: 200_000,
                reload_interval: Duration::from_millis(1),
            },
        );

        assert!(report.passed());
        assert_eq!(report.reloads, 0);
        assert!(report.failed_reloads > 0);
        assert_eq!(report.generation, 1);
    }
}
