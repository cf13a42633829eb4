//! Content engine metrics.
//!
//! Counts the recoveries the engine performs silently (legacy migrations,
//! unreadable payloads, display fallbacks) so they can be reported even though
//! they never reach the user as errors.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global content engine metrics singleton.
pub struct SyncMetrics {
    /// Payloads read in the legacy single-language format
    legacy_migrations: AtomicUsize,

    /// Payloads that failed to parse and were replaced by empty records
    malformed_recoveries: AtomicUsize,

    /// Display reads that fell back to another language
    fallback_resolutions: AtomicUsize,

    /// Successful saves
    saves: AtomicUsize,

    /// Failed saves
    save_failures: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<SyncMetrics> = OnceLock::new();

impl SyncMetrics {
    /// Get the global metrics instance.
    pub fn global() -> &'static SyncMetrics {
        METRICS.get_or_init(SyncMetrics::new)
    }

    fn new() -> Self {
        Self {
            legacy_migrations: AtomicUsize::new(0),
            malformed_recoveries: AtomicUsize::new(0),
            fallback_resolutions: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            save_failures: AtomicUsize::new(0),
        }
    }

    pub fn record_legacy_migration(&self) {
        self.legacy_migrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_recovery(&self) {
        self.malformed_recoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_resolution(&self) {
        self.fallback_resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save(&self) {
        self.saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save_failure(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn legacy_migrations(&self) -> usize {
        self.legacy_migrations.load(Ordering::Relaxed)
    }

    pub fn malformed_recoveries(&self) -> usize {
        self.malformed_recoveries.load(Ordering::Relaxed)
    }

    pub fn fallback_resolutions(&self) -> usize {
        self.fallback_resolutions.load(Ordering::Relaxed)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn save_failures(&self) -> usize {
        self.save_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let saves = self.saves();
        let failures = self.save_failures();
        let attempts = saves + failures;
        let save_success_rate = if attempts > 0 {
            (saves as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            legacy_migrations: self.legacy_migrations(),
            malformed_recoveries: self.malformed_recoveries(),
            fallback_resolutions: self.fallback_resolutions(),
            saves,
            save_failures: failures,
            save_success_rate,
        }
    }
}

/// Snapshot of the engine counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub legacy_migrations: usize,
    pub malformed_recoveries: usize,
    pub fallback_resolutions: usize,
    pub saves: usize,
    pub save_failures: usize,

    /// Save success rate as a percentage (0-100)
    pub save_success_rate: f64,
}

impl MetricsReport {
    /// Format the report as a short log line.
    pub fn summary_line(&self) -> String {
        format!(
            "legacy={} malformed={} fallbacks={} saves={} failures={} success={:.1}%",
            self.legacy_migrations,
            self.malformed_recoveries,
            self.fallback_resolutions,
            self.saves,
            self.save_failures,
            self.save_success_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_singleton() {
        assert!(std::ptr::eq(SyncMetrics::global(), SyncMetrics::global()));
    }

    #[test]
    fn test_record_and_report() {
        let metrics = SyncMetrics::new();

        metrics.record_legacy_migration();
        metrics.record_malformed_recovery();
        metrics.record_fallback_resolution();
        metrics.record_fallback_resolution();
        metrics.record_save();
        metrics.record_save();
        metrics.record_save();
        metrics.record_save_failure();

        let report = metrics.report();
        assert_eq!(report.legacy_migrations, 1);
        assert_eq!(report.malformed_recoveries, 1);
        assert_eq!(report.fallback_resolutions, 2);
        assert_eq!(report.saves, 3);
        assert_eq!(report.save_failures, 1);
        assert!((report.save_success_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_zero_without_attempts() {
        assert_eq!(SyncMetrics::new().report().save_success_rate, 0.0);
    }

    #[test]
    fn test_report_serializes() {
        let report = SyncMetrics::new().report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["saves"], 0);
        assert!(report.summary_line().contains("saves=0"));
    }
}
