// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span helpers for report delivery.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug_span, Span};

use super::metrics::SentinelMetrics;

/// RAII guard timing one report POST.
///
/// Records the origin, duration and outcome on a tracing span and, with the
/// `telemetry` feature, into the context's metrics.
pub struct ReportSpan {
    start: Instant,
    span: Span,
    metrics: Arc<SentinelMetrics>,
}

impl ReportSpan {
    /// Start timing a report for `origin`.
    pub fn start(origin: &str, metrics: Arc<SentinelMetrics>) -> Self {
        let span = debug_span!(
            "report",
            origin = %origin,
            duration_ms = tracing::field::Empty,
            delivered = tracing::field::Empty,
            status = tracing::field::Empty,
        );

        Self {
            start: Instant::now(),
            span,
            metrics,
        }
    }

    /// Get the underlying tracing span.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Record the collector's status code.
    pub fn record_status(&self, status: u16) {
        self.span.record("status", status as i64);
    }

    /// Finish the span, recording duration and outcome.
    pub fn finish(self, delivered: bool) {
        let duration = self.start.elapsed();

        self.span.record("duration_ms", duration.as_secs_f64() * 1000.0);
        self.span.record("delivered", delivered);

        #[cfg(feature = "telemetry")]
        self.metrics.record_delivery(duration, delivered);
        #[cfg(not(feature = "telemetry"))]
        let _ = &self.metrics;
    }
}
