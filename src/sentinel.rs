// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Sentinel contexts and the process-wide singleton.
//!
//! A [`SentinelContext`] owns everything one sentinel needs: configuration,
//! metrics, the seen-origin set, the report dispatcher and the interception
//! registry. Contexts are independent of each other; tests and embedders
//! build them directly.
//!
//! [`init`] keeps one context per process for hosts that want the
//! initialize-once behavior.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::OnceCell;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::{load_config, InitOptions, SentinelConfig, SentinelOptions};
use crate::dedup::OriginDeduplicator;
use crate::error::SentinelError;
use crate::intercept::{
    wrap, Fetch, InterceptionRegistry, NetworkApis, Observed, Observer, SocketConstructor, XhrOpen,
};
use crate::reporter::{HttpTransport, TelemetryReporter, Transport};
use crate::telemetry::SentinelMetrics;
use crate::types::ApiKind;

/// One isolated sentinel.
#[derive(Debug)]
pub struct SentinelContext {
    config: Arc<SentinelConfig>,
    metrics: Arc<SentinelMetrics>,
    observer: Arc<Observer>,
    registry: InterceptionRegistry,
}

impl SentinelContext {
    /// Build a context on the current tokio runtime.
    pub fn new(config: SentinelConfig, transport: Arc<dyn Transport>) -> Result<Self, SentinelError> {
        let handle = Handle::try_current().map_err(|_| SentinelError::NoRuntime)?;
        Self::with_handle(config, transport, &handle)
    }

    /// Build a context whose report dispatcher runs on `handle`.
    pub fn with_handle(
        config: SentinelConfig,
        transport: Arc<dyn Transport>,
        handle: &Handle,
    ) -> Result<Self, SentinelError> {
        config.validate()?;

        let config = Arc::new(config);
        let metrics = Arc::new(SentinelMetrics::new());
        let dedup = Arc::new(OriginDeduplicator::new(Arc::clone(&config), Arc::clone(&metrics)));
        let reporter = TelemetryReporter::spawn(
            Arc::clone(&config),
            transport,
            Arc::clone(&metrics),
            handle,
        );
        let observer = Arc::new(Observer::new(
            Arc::clone(&config),
            dedup,
            reporter,
            Arc::clone(&metrics),
        ));
        let registry = InterceptionRegistry::new(Arc::clone(&observer));

        Ok(Self {
            config,
            metrics,
            observer,
            registry,
        })
    }

    /// Build a context that posts reports over HTTP.
    pub fn with_http_transport(config: SentinelConfig) -> Result<Self, SentinelError> {
        let transport = HttpTransport::new(config.report_timeout)
            .map_err(|e| SentinelError::Transport(e.to_string()))?;
        Self::new(config, Arc::new(transport))
    }

    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<SentinelMetrics> {
        &self.metrics
    }

    pub fn observer(&self) -> &Arc<Observer> {
        &self.observer
    }

    pub fn registry(&self) -> &InterceptionRegistry {
        &self.registry
    }

    /// Wrap one entry point with this context's observer, without touching
    /// any installed slot.
    pub fn wrap<T>(&self, original: T) -> Observed<T> {
        wrap(original, Arc::clone(&self.observer))
    }

    /// Hook the host's slots for every entry point enabled in the options.
    ///
    /// Returns the entry points hooked by this call; slots that were already
    /// hooked are left as they are.
    pub fn install<X, F, S>(&self, apis: &mut NetworkApis<X, F, S>) -> Vec<ApiKind>
    where
        X: XhrOpen,
        F: Fetch,
        S: SocketConstructor,
    {
        let options = &self.config.options;
        let mut installed = Vec::new();

        if options.override_xml_http_request && self.registry.install_xhr_interception(&mut apis.xhr) {
            installed.push(ApiKind::XmlHttpRequest);
        }
        if options.override_fetch && self.registry.install_fetch_interception(&mut apis.fetch) {
            installed.push(ApiKind::Fetch);
        }
        if options.override_web_socket
            && self.registry.install_websocket_interception(&mut apis.websocket)
        {
            installed.push(ApiKind::WebSocket);
        }

        installed
    }
}

/// The process-wide sentinel returned by [`init`].
#[derive(Debug)]
pub struct Sentinel {
    context: SentinelContext,
}

impl Sentinel {
    pub fn context(&self) -> &SentinelContext {
        &self.context
    }

    /// See [`SentinelContext::install`].
    pub fn install<X, F, S>(&self, apis: &mut NetworkApis<X, F, S>) -> Vec<ApiKind>
    where
        X: XhrOpen,
        F: Fetch,
        S: SocketConstructor,
    {
        self.context.install(apis)
    }
}

static SENTINEL: OnceCell<Sentinel> = OnceCell::new();

/// Initialize the process-wide sentinel.
///
/// The first successful call wins. Later calls return the existing sentinel
/// and their arguments are ignored. Must be called from within a tokio
/// runtime, which then runs report delivery.
pub fn init(
    api_key: impl Into<String>,
    app_version: impl Into<String>,
    app_environment: impl Into<String>,
    options: SentinelOptions,
) -> Result<&'static Sentinel, SentinelError> {
    if let Some(existing) = SENTINEL.get() {
        debug!("Request Sentinel | Already initialised, ignoring init arguments");
        return Ok(existing);
    }

    let config = SentinelConfig::new(api_key, app_version, app_environment).with_options(options);
    init_with_config(config)
}

/// Initialize the process-wide sentinel from a fully built configuration.
pub fn init_with_config(config: SentinelConfig) -> Result<&'static Sentinel, SentinelError> {
    let mut created = false;
    let sentinel = SENTINEL.get_or_try_init(|| {
        created = true;
        SentinelContext::with_http_transport(config).map(|context| Sentinel { context })
    })?;

    if created {
        info!("Request Sentinel initialised");
    } else {
        debug!("Request Sentinel | Already initialised, ignoring configuration");
    }

    Ok(sentinel)
}

/// Initialize the process-wide sentinel from the configuration files and
/// environment of `workspace_root`, with `init` taking precedence.
pub fn init_from_workspace(workspace_root: &Path, init: InitOptions) -> crate::error::Result<&'static Sentinel> {
    let config = load_config(workspace_root, init)
        .with_context(|| format!("Failed to load configuration from {}", workspace_root.display()))?;

    init_with_config(config).context("Failed to initialise Request Sentinel")
}

/// The process-wide sentinel, if [`init`] has succeeded.
pub fn get() -> Option<&'static Sentinel> {
    SENTINEL.get()
}
