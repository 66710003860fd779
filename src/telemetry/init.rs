// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Subscriber setup for hosts that want to see Request Sentinel diagnostics.
//!
//! The library only emits `tracing` events. Nothing is printed unless the
//! host installs a subscriber, either its own or the one built here.

use std::io;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::SentinelOptions;

/// Target of every event emitted by this crate.
pub const LOG_TARGET: &str = "request_sentinel";

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event.
    #[default]
    Compact,
    /// Multi-line, with span context.
    Pretty,
}

/// How the subscriber built by [`init_telemetry`] behaves.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Level for this crate's events when `RUST_LOG` is unset.
    pub level: Level,

    /// Explicit filter directive; takes precedence over `level`.
    pub directive: Option<String>,

    pub format: LogFormat,

    /// Emit an event when each report span closes.
    pub span_close_events: bool,

    pub ansi: bool,

    /// Write through the test harness's capture instead of stderr.
    pub test_writer: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            directive: None,
            format: LogFormat::Compact,
            span_close_events: false,
            ansi: true,
            test_writer: false,
        }
    }
}

impl TelemetryConfig {
    /// Follow the `debug` option: per-call lines are `info` events, so they
    /// are only visible when debug is on.
    pub fn for_options(options: &SentinelOptions) -> Self {
        let level = if options.debug { Level::INFO } else { Level::WARN };
        Self {
            level,
            ..Self::default()
        }
    }

    /// Everything, with report span timings.
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::Pretty,
            span_close_events: true,
            ..Self::default()
        }
    }

    /// Failures only, without colors.
    pub fn production() -> Self {
        Self {
            level: Level::WARN,
            ansi: false,
            ..Self::default()
        }
    }

    /// Every event of this crate, captured per test.
    pub fn testing() -> Self {
        Self {
            level: Level::TRACE,
            directive: Some(format!("{LOG_TARGET}=trace")),
            span_close_events: true,
            ansi: false,
            test_writer: true,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// Build the filter. `RUST_LOG` wins unless a directive was set; an
    /// invalid directive falls back to `level` for this crate.
    pub fn filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(format!("{LOG_TARGET}={}", self.level));

        match &self.directive {
            Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|_| fallback()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
        }
    }
}

/// Returned by [`init_telemetry`]; hold it for as long as diagnostics matter.
#[must_use]
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::trace!(target: LOG_TARGET, "telemetry guard dropped");
    }
}

/// Install a global `fmt` subscriber configured by `config`.
///
/// Fails if the process already has a global subscriber.
///
/// # Example
///
/// ```rust,ignore
/// use request_sentinel::telemetry::{init_telemetry, TelemetryConfig};
///
/// let options = SentinelOptions::default().with_debug(true);
/// let _guard = init_telemetry(&TelemetryConfig::for_options(&options))?;
/// let sentinel = request_sentinel::init("api-key", "1.0.0", "production", options)?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> io::Result<TelemetryGuard> {
    let span_events = if config.span_close_events {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_ansi(config.ansi)
        .with_span_events(span_events);

    let registry = tracing_subscriber::registry().with(config.filter());

    let installed = match (config.format, config.test_writer) {
        (LogFormat::Compact, false) => registry.with(layer.compact().with_writer(io::stderr)).try_init(),
        (LogFormat::Compact, true) => registry.with(layer.compact().with_test_writer()).try_init(),
        (LogFormat::Pretty, false) => registry.with(layer.pretty().with_writer(io::stderr)).try_init(),
        (LogFormat::Pretty, true) => registry.with(layer.pretty().with_test_writer()).try_init(),
    };
    installed.map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(TelemetryGuard { _private: () })
}
