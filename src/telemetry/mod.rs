// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Logging and metrics infrastructure.
//!
//! This module is the diagnostic channel of Request Sentinel:
//!
//! - **Tracing**: every malformed target, failed report and ignored
//!   re-initialization ends in a `tracing` event, never in an error raised
//!   into the host
//! - **Metrics**: per-context counters for observed calls and report outcomes
//! - **Spans**: timing of each report POST
//!
//! # Usage
//!
//! The host decides where diagnostics go. A typical setup:
//!
//! ```rust,ignore
//! use request_sentinel::telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::for_options(&options))?;
//! ```
//!
//! # Log levels
//!
//! - `trace`: per-call pipeline decisions (duplicate, collector)
//! - `debug`: installs, ignored re-initialization, delivered reports
//! - `info`: initialization, and the per-call lines enabled by the `debug` option
//! - `warn`/`error`: malformed targets, failed reports

mod init;
pub mod metrics;
mod spans;

pub use init::{init_telemetry, LogFormat, TelemetryConfig, TelemetryGuard, LOG_TARGET};
pub use metrics::{MetricsSnapshot, ReportLatency, SentinelMetrics};
pub use spans::ReportSpan;
