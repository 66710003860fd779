// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry reporting.
//!
//! [`TelemetryReporter::report`] is synchronous and infallible from the
//! caller's point of view: it serializes nothing and awaits nothing, it only
//! enqueues a payload. A dispatcher task drains the queue in interception
//! order and starts one POST per payload in that order, without waiting for
//! the previous one to finish. The outcome of each POST is seen only by the
//! diagnostic channel.
//!
//! ```text
//! report() ──► unbounded channel ──► dispatcher ──► deliver ──► collector
//!  (sync)                            (one task)     (concurrent, one per origin)
//! ```

mod transport;

pub use transport::{HttpTransport, IngestRequest, Transport, API_KEY_HEADER};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, warn, Instrument};

use crate::config::SentinelConfig;
use crate::error::ReportError;
use crate::telemetry::{ReportSpan, SentinelMetrics};
use crate::types::{CanonicalOrigin, ReportPayload};

/// Status the collector answers with when it accepts a report.
pub const EXPECTED_STATUS: u16 = 201;

/// Fire-and-forget delivery of reports to the collector.
#[derive(Debug, Clone)]
pub struct TelemetryReporter {
    config: Arc<SentinelConfig>,
    queue: mpsc::UnboundedSender<ReportPayload>,
    metrics: Arc<SentinelMetrics>,
}

impl TelemetryReporter {
    /// Start a reporter whose dispatcher runs on `handle`.
    pub fn spawn(
        config: Arc<SentinelConfig>,
        transport: Arc<dyn Transport>,
        metrics: Arc<SentinelMetrics>,
        handle: &Handle,
    ) -> Self {
        let (queue, pending) = mpsc::unbounded_channel();

        handle.spawn(dispatch(
            pending,
            config.ingest_url(),
            config.api_key.clone(),
            transport,
            Arc::clone(&metrics),
        ));

        Self {
            config,
            queue,
            metrics,
        }
    }

    /// Queue one report for `origin`. Never blocks and never fails.
    pub fn report(&self, origin: &CanonicalOrigin, method: &str, timestamp: DateTime<Utc>) {
        if self.config.is_collector_target(origin.as_str()) {
            return;
        }

        let payload = ReportPayload::new(
            &self.config.app_version,
            &self.config.app_environment,
            origin,
            method,
            timestamp,
        );

        match self.queue.send(payload) {
            Ok(()) => {
                #[cfg(feature = "telemetry")]
                self.metrics.record_issued();
            }
            Err(_) => {
                warn!(%origin, error = %ReportError::DispatcherClosed, "Request Sentinel | Report dropped");
            }
        }
    }
}

async fn dispatch(
    mut pending: mpsc::UnboundedReceiver<ReportPayload>,
    ingest_url: String,
    api_key: String,
    transport: Arc<dyn Transport>,
    metrics: Arc<SentinelMetrics>,
) {
    // Newly pushed futures are first polled in push order, so POSTs start in
    // queue order while earlier ones are still in flight.
    let mut in_flight = FuturesUnordered::new();
    let mut open = true;

    loop {
        tokio::select! {
            biased;

            received = pending.recv(), if open => match received {
                Some(payload) => in_flight.push(deliver(
                    transport.as_ref(),
                    ingest_url.clone(),
                    api_key.clone(),
                    payload,
                    Arc::clone(&metrics),
                )),
                None => open = false,
            },
            // Failures are already logged inside deliver.
            Some(_) = in_flight.next(), if !in_flight.is_empty() => {}
            else => break,
        }
    }

    debug!("Request Sentinel | Report dispatcher stopped");
}

/// Post one payload and classify the outcome.
///
/// Any status other than [`EXPECTED_STATUS`] and any transport failure is
/// terminal: it is logged and returned, never retried.
pub async fn deliver(
    transport: &dyn Transport,
    ingest_url: String,
    api_key: String,
    payload: ReportPayload,
    metrics: Arc<SentinelMetrics>,
) -> Result<(), ReportError> {
    let span = ReportSpan::start(&payload.url, metrics);

    let result = match serde_json::to_string(&payload) {
        Ok(body) => {
            let request = IngestRequest {
                url: ingest_url,
                api_key,
                body,
            };
            match transport.post(request).instrument(span.span().clone()).await {
                Ok(status) => {
                    span.record_status(status);
                    if status == EXPECTED_STATUS {
                        Ok(())
                    } else {
                        Err(ReportError::UnexpectedStatus(status))
                    }
                }
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(ReportError::from(e)),
    };

    span.finish(result.is_ok());

    match &result {
        Ok(()) => debug!(origin = %payload.url, method = %payload.method, "Request Sentinel | Report delivered"),
        Err(e) => error!(origin = %payload.url, error = %e, "Request Sentinel | Error"),
    }

    result
}
