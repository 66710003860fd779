// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Interception of the three network entry points.
//!
//! Each entry-point shape has a trait:
//!
//! - [`XhrOpen`]: configure-then-send request objects
//! - [`Fetch`]: functions returning a pending response
//! - [`SocketConstructor`]: socket constructors
//!
//! [`wrap`] decorates any of them with an [`Observer`]. The result,
//! [`Observed<T>`], implements the same trait with the same output types,
//! runs the observation hook, and then hands the caller's arguments to the
//! original untouched.
//!
//! # Side effects
//!
//! [`InterceptionRegistry`] installs observers into the host's entry-point
//! slots ([`NetworkApis`]). Those slots are process-wide state of the host:
//! once hooked, every caller going through them is observed, and a slot is
//! never hooked twice.

mod fetch;
mod observed;
mod websocket;
mod xhr;

pub use fetch::{Fetch, ReqwestFetch, ResponseFuture};
pub use observed::{wrap, Observed};
pub use websocket::SocketConstructor;
pub use xhr::XhrOpen;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::SentinelConfig;
use crate::dedup::OriginDeduplicator;
use crate::reporter::TelemetryReporter;
use crate::telemetry::SentinelMetrics;
use crate::types::{ApiKind, ObservedCall, Target};

/// The observation hook run by every hooked entry point.
#[derive(Debug)]
pub struct Observer {
    config: Arc<SentinelConfig>,
    dedup: Arc<OriginDeduplicator>,
    reporter: TelemetryReporter,
    metrics: Arc<SentinelMetrics>,
}

impl Observer {
    pub fn new(
        config: Arc<SentinelConfig>,
        dedup: Arc<OriginDeduplicator>,
        reporter: TelemetryReporter,
        metrics: Arc<SentinelMetrics>,
    ) -> Self {
        Self {
            config,
            dedup,
            reporter,
            metrics,
        }
    }

    /// Observe one call: log it if asked to, then report its origin the
    /// first time it is seen.
    ///
    /// Runs synchronously on the caller's thread and never fails.
    pub fn observe(&self, api: ApiKind, method: &str, target: impl Into<Target>) {
        let call = ObservedCall::new(api, method, target);

        #[cfg(feature = "telemetry")]
        self.metrics.record_observed(api);
        #[cfg(not(feature = "telemetry"))]
        let _ = &self.metrics;

        if self.config.options.debug && !self.config.is_collector_target(call.raw_target.as_str()) {
            match api {
                ApiKind::WebSocket => info!("Request Sentinel | [{}] Connection to {}", api, call.raw_target),
                _ => info!("Request Sentinel | [{}] {} request to {}", api, call.method, call.raw_target),
            }
        }

        if let Some(origin) = self.dedup.admit(&call) {
            self.reporter.report(&origin, &call.method, call.timestamp);
        }
    }

    pub fn dedup(&self) -> &OriginDeduplicator {
        &self.dedup
    }
}

/// Which entry points a registry has hooked.
#[derive(Debug, Default)]
pub struct InterceptionState {
    xhr: AtomicBool,
    fetch: AtomicBool,
    websocket: AtomicBool,
}

impl InterceptionState {
    fn flag(&self, api: ApiKind) -> &AtomicBool {
        match api {
            ApiKind::XmlHttpRequest => &self.xhr,
            ApiKind::Fetch => &self.fetch,
            ApiKind::WebSocket => &self.websocket,
        }
    }

    pub fn is_installed(&self, api: ApiKind) -> bool {
        self.flag(api).load(Ordering::Acquire)
    }

    /// Set the flag for `api`; `false` if it was already set.
    fn claim(&self, api: ApiKind) -> bool {
        self.flag(api)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// The host's three entry-point slots.
#[derive(Debug, Clone)]
pub struct NetworkApis<X, F, S> {
    pub xhr: Observed<X>,
    pub fetch: Observed<F>,
    pub websocket: Observed<S>,
}

impl<X, F, S> NetworkApis<X, F, S> {
    /// Slots holding the given originals, none of them hooked.
    pub fn new(xhr: X, fetch: F, websocket: S) -> Self {
        Self {
            xhr: Observed::unhooked(xhr),
            fetch: Observed::unhooked(fetch),
            websocket: Observed::unhooked(websocket),
        }
    }
}

/// Installs one observer into entry-point slots, at most once per entry point.
///
/// Installing mutates the host's slots in place. See the module docs.
#[derive(Debug)]
pub struct InterceptionRegistry {
    observer: Arc<Observer>,
    state: InterceptionState,
}

impl InterceptionRegistry {
    pub fn new(observer: Arc<Observer>) -> Self {
        Self {
            observer,
            state: InterceptionState::default(),
        }
    }

    pub fn state(&self) -> &InterceptionState {
        &self.state
    }

    pub fn observer(&self) -> &Arc<Observer> {
        &self.observer
    }

    /// Hook the `open` slot. Returns whether anything changed.
    pub fn install_xhr_interception<X: XhrOpen>(&self, slot: &mut Observed<X>) -> bool {
        self.install(ApiKind::XmlHttpRequest, slot)
    }

    /// Hook the `fetch` slot. Returns whether anything changed.
    pub fn install_fetch_interception<F: Fetch>(&self, slot: &mut Observed<F>) -> bool {
        self.install(ApiKind::Fetch, slot)
    }

    /// Hook the socket constructor slot. Returns whether anything changed.
    pub fn install_websocket_interception<S: SocketConstructor>(&self, slot: &mut Observed<S>) -> bool {
        self.install(ApiKind::WebSocket, slot)
    }

    fn install<T>(&self, api: ApiKind, slot: &mut Observed<T>) -> bool {
        if slot.is_hooked() {
            debug!(%api, "Request Sentinel | Entry point already hooked, skipping");
            return false;
        }
        if !self.state.claim(api) {
            debug!(%api, "Request Sentinel | Interception already installed, skipping");
            return false;
        }

        slot.attach(Arc::clone(&self.observer));
        debug!(%api, "Request Sentinel | Interception installed");
        true
    }
}
