// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Metrics collection for the observation pipeline.
//!
//! Lightweight counters without external dependencies. Each sentinel context
//! owns one [`SentinelMetrics`], so isolated contexts never share counts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::types::ApiKind;

/// Counters for one sentinel context.
#[derive(Debug)]
pub struct SentinelMetrics {
    observed_xhr: AtomicU64,
    observed_fetch: AtomicU64,
    observed_websocket: AtomicU64,

    /// Reports handed to the dispatcher.
    reports_issued: AtomicU64,

    /// Reports the collector accepted with 201.
    reports_delivered: AtomicU64,

    /// Reports that failed in transport or got another status.
    reports_failed: AtomicU64,

    duplicates_suppressed: AtomicU64,
    self_excluded: AtomicU64,
    malformed_targets: AtomicU64,

    /// Latency of report POSTs.
    report_latency: RwLock<ReportLatency>,

    /// Start time for calculating uptime.
    start_time: Instant,
}

impl SentinelMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            observed_xhr: AtomicU64::new(0),
            observed_fetch: AtomicU64::new(0),
            observed_websocket: AtomicU64::new(0),
            reports_issued: AtomicU64::new(0),
            reports_delivered: AtomicU64::new(0),
            reports_failed: AtomicU64::new(0),
            duplicates_suppressed: AtomicU64::new(0),
            self_excluded: AtomicU64::new(0),
            malformed_targets: AtomicU64::new(0),
            report_latency: RwLock::new(ReportLatency::default()),
            start_time: Instant::now(),
        }
    }

    fn observed_counter(&self, api: ApiKind) -> &AtomicU64 {
        match api {
            ApiKind::XmlHttpRequest => &self.observed_xhr,
            ApiKind::Fetch => &self.observed_fetch,
            ApiKind::WebSocket => &self.observed_websocket,
        }
    }

    /// Record one intercepted call.
    pub fn record_observed(&self, api: ApiKind) {
        self.observed_counter(api).fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_issued(&self) {
        self.reports_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished report POST.
    pub fn record_delivery(&self, duration: Duration, delivered: bool) {
        if delivered {
            self.reports_delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.reports_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.report_latency
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .record(duration);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_self_excluded(&self) {
        self.self_excluded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed_targets.fetch_add(1, Ordering::Relaxed);
    }

    /// Calls observed through one entry point.
    pub fn observed(&self, api: ApiKind) -> u64 {
        self.observed_counter(api).load(Ordering::Relaxed)
    }

    /// Get uptime since metrics were initialized.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Take a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            observed_xhr: self.observed(ApiKind::XmlHttpRequest),
            observed_fetch: self.observed(ApiKind::Fetch),
            observed_websocket: self.observed(ApiKind::WebSocket),
            reports_issued: self.reports_issued.load(Ordering::Relaxed),
            reports_delivered: self.reports_delivered.load(Ordering::Relaxed),
            reports_failed: self.reports_failed.load(Ordering::Relaxed),
            duplicates_suppressed: self.duplicates_suppressed.load(Ordering::Relaxed),
            self_excluded: self.self_excluded.load(Ordering::Relaxed),
            malformed_targets: self.malformed_targets.load(Ordering::Relaxed),
            report_latency: self
                .report_latency
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            uptime: self.uptime(),
        }
    }
}

impl Default for SentinelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper bounds of the latency buckets, in milliseconds. A last bucket
/// catches everything slower.
pub const LATENCY_BOUNDS_MS: [u64; 5] = [25, 100, 250, 1_000, 5_000];

/// Latency distribution of report POSTs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportLatency {
    pub samples: u64,
    pub total: Duration,
    pub max: Duration,
    buckets: [u64; LATENCY_BOUNDS_MS.len() + 1],
}

impl ReportLatency {
    pub fn record(&mut self, duration: Duration) {
        self.samples += 1;
        self.total += duration;
        self.max = self.max.max(duration);

        let millis = duration.as_millis();
        let bucket = LATENCY_BOUNDS_MS
            .iter()
            .position(|&bound| millis <= u128::from(bound))
            .unwrap_or(LATENCY_BOUNDS_MS.len());
        self.buckets[bucket] += 1;
    }

    pub fn mean(&self) -> Duration {
        match u32::try_from(self.samples) {
            Ok(0) => Duration::ZERO,
            Ok(samples) => self.total / samples,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.samples as f64),
        }
    }

    /// Samples per bucket, slowest bucket last.
    pub fn buckets(&self) -> &[u64] {
        &self.buckets
    }

    /// Upper bound of the bucket holding quantile `q` (0.0..=1.0).
    ///
    /// Samples past the last bound report the observed maximum.
    pub fn quantile(&self, q: f64) -> Duration {
        if self.samples == 0 {
            return Duration::ZERO;
        }

        let rank = ((self.samples as f64) * q.clamp(0.0, 1.0)).ceil().max(1.0) as u64;
        let mut seen = 0;
        for (bucket, count) in self.buckets.iter().enumerate() {
            seen += count;
            if seen >= rank {
                return LATENCY_BOUNDS_MS
                    .get(bucket)
                    .map(|&bound| Duration::from_millis(bound))
                    .unwrap_or(self.max);
            }
        }
        self.max
    }
}

/// A snapshot of all metrics at a point in time.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub observed_xhr: u64,
    pub observed_fetch: u64,
    pub observed_websocket: u64,
    pub reports_issued: u64,
    pub reports_delivered: u64,
    pub reports_failed: u64,
    pub duplicates_suppressed: u64,
    pub self_excluded: u64,
    pub malformed_targets: u64,
    pub report_latency: ReportLatency,
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Total intercepted calls across all entry points.
    pub fn observed_total(&self) -> u64 {
        self.observed_xhr + self.observed_fetch + self.observed_websocket
    }

    /// Format as a human-readable report.
    pub fn format_report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Request Sentinel ===\n\n");
        report.push_str(&format!("Uptime: {:.2?}\n", self.uptime));
        report.push_str(&format!(
            "Observed: {} XMLHttpRequest, {} fetch, {} WebSocket\n",
            self.observed_xhr, self.observed_fetch, self.observed_websocket
        ));
        report.push_str(&format!(
            "Reports: {} issued, {} delivered, {} failed\n",
            self.reports_issued, self.reports_delivered, self.reports_failed
        ));
        report.push_str(&format!(
            "Skipped: {} duplicate, {} collector, {} malformed\n",
            self.duplicates_suppressed, self.self_excluded, self.malformed_targets
        ));

        if self.report_latency.samples > 0 {
            report.push_str(&format!(
                "Report latency: mean {:.2?}, p99 <= {:.2?}, max {:.2?}\n",
                self.report_latency.mean(),
                self.report_latency.quantile(0.99),
                self.report_latency.max
            ));
        }

        report
    }
}
