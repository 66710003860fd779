// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! [`ConfigFile`] is the partial, serializable shape read from JSON/YAML files
//! and the environment. [`SentinelConfig`] is the resolved, validated,
//! immutable configuration shared by every component of a context.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Collector used when none is configured.
pub const DEFAULT_COLLECTOR_URL: &str = "https://api.requestsentinel.com";

/// Ingestion path on the collector.
pub const INGEST_PATH: &str = "/processor/ingest/request/outgoing";

/// Default transport timeout for one report, in milliseconds.
pub const DEFAULT_REPORT_TIMEOUT_MS: u64 = 10_000;

/// Feature toggles recognized by `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SentinelOptions {
    /// Install fetch interception.
    pub override_fetch: bool,

    /// Install XMLHttpRequest interception.
    #[serde(rename = "overrideXMLHttpRequest")]
    pub override_xml_http_request: bool,

    /// Install WebSocket interception.
    pub override_web_socket: bool,

    /// Reserved. Request bodies are never transmitted either way.
    pub ignore_body: bool,

    /// Log one line per intercepted call (collector calls excluded).
    pub debug: bool,
}

impl Default for SentinelOptions {
    fn default() -> Self {
        Self {
            override_fetch: true,
            override_xml_http_request: true,
            override_web_socket: true,
            ignore_body: true,
            debug: false,
        }
    }
}

impl SentinelOptions {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Options with every interception disabled.
    pub fn none() -> Self {
        Self {
            override_fetch: false,
            override_xml_http_request: false,
            override_web_socket: false,
            ..Default::default()
        }
    }
}

/// Partial toggles as they appear in config files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentinelOptionsPartial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_fetch: Option<bool>,

    #[serde(rename = "overrideXMLHttpRequest", skip_serializing_if = "Option::is_none")]
    pub override_xml_http_request: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_web_socket: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_body: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl SentinelOptionsPartial {
    /// Overlay the set fields onto `options`.
    pub fn apply_to(&self, options: &mut SentinelOptions) {
        if let Some(value) = self.override_fetch {
            options.override_fetch = value;
        }
        if let Some(value) = self.override_xml_http_request {
            options.override_xml_http_request = value;
        }
        if let Some(value) = self.override_web_socket {
            options.override_web_socket = value;
        }
        if let Some(value) = self.ignore_body {
            options.ignore_body = value;
        }
        if let Some(value) = self.debug {
            options.debug = value;
        }
    }
}

/// Configuration as read from a file or the environment.
/// Can be defined in .sentinel.json, .sentinel.yaml or sentinel.config.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Credential sent in the API-KEY header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Version of the instrumented application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    /// Environment label (production, staging, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_environment: Option<String>,

    /// Collector base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collector_url: Option<String>,

    /// Base URL for resolving relative targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_origin: Option<String>,

    /// Transport timeout for one report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_timeout_ms: Option<u64>,

    /// Interception toggles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SentinelOptionsPartial>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SentinelConfig {
    pub api_key: String,
    pub app_version: String,
    pub app_environment: String,
    pub options: SentinelOptions,
    pub collector_url: Url,
    pub document_origin: Option<Url>,
    pub report_timeout: Duration,
}

impl SentinelConfig {
    /// Configuration pointing at the default collector.
    pub fn new(
        api_key: impl Into<String>,
        app_version: impl Into<String>,
        app_environment: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            app_version: app_version.into(),
            app_environment: app_environment.into(),
            options: SentinelOptions::default(),
            collector_url: default_collector_url(),
            document_origin: None,
            report_timeout: Duration::from_millis(DEFAULT_REPORT_TIMEOUT_MS),
        }
    }

    pub fn with_options(mut self, options: SentinelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_collector_url(mut self, url: Url) -> Self {
        self.collector_url = url;
        self
    }

    pub fn with_document_origin(mut self, origin: Url) -> Self {
        self.document_origin = Some(origin);
        self
    }

    pub fn with_report_timeout(mut self, timeout: Duration) -> Self {
        self.report_timeout = timeout;
        self
    }

    /// Host of the collector, used for self-exclusion.
    pub fn collector_host(&self) -> Option<&str> {
        self.collector_url.host_str()
    }

    /// Whether `text` points at the collector.
    pub fn is_collector_target(&self, text: &str) -> bool {
        match self.collector_host() {
            Some(host) => text.contains(host),
            None => false,
        }
    }

    /// Full URL reports are posted to.
    pub fn ingest_url(&self) -> String {
        format!(
            "{}{}",
            self.collector_url.as_str().trim_end_matches('/'),
            INGEST_PATH
        )
    }

    /// Check invariants that cannot be expressed in the types.
    ///
    /// The API key is opaque and is sent as given, empty or not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collector_host().is_none() {
            return Err(ConfigError::invalid("collectorUrl", "collector URL has no host"));
        }
        Ok(())
    }
}

/// Parsed [`DEFAULT_COLLECTOR_URL`].
pub fn default_collector_url() -> Url {
    Url::parse(DEFAULT_COLLECTOR_URL).expect("default collector URL is valid")
}
