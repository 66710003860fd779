// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core type definitions for Request Sentinel.
//!
//! These types describe what the three intercepted entry points receive from
//! the host (targets, fetch inputs, `open` arguments) and what one pass of the
//! observation pipeline produces (observed calls, canonical origins, report
//! payloads).

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Method recorded for socket connections.
pub const WEBSOCKET_METHOD: &str = "WEBSOCKET";

/// Method recorded for fetch calls that do not name one.
pub const DEFAULT_METHOD: &str = "GET";

/// SDK identifier sent with every report.
pub const SDK_IDENTIFIER: &str = "js";

// ============================================================================
// Targets
// ============================================================================

/// Destination of an intercepted call, as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Free-form text; may be absolute, relative, or garbage.
    Text(String),
    /// An already-parsed URL.
    Url(Url),
}

impl Target {
    /// Borrow the target as text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Url(url) => url.as_str(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Target {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Target {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

// ============================================================================
// Fetch inputs
// ============================================================================

/// A structured request handed to `fetch` in place of a URL string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// First argument of `fetch`.
///
/// A string, a [`Request`], or anything else that renders to a URL.
pub enum RequestInfo {
    Url(String),
    Request(Request),
    Other(Box<dyn fmt::Display + Send + Sync>),
}

impl RequestInfo {
    /// Wrap any displayable value as a fetch input.
    pub fn other(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(value))
    }

    /// The URL this input points at.
    pub fn url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Request(request) => request.url.clone(),
            Self::Other(value) => value.to_string(),
        }
    }
}

impl fmt::Debug for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Request(request) => f.debug_tuple("Request").field(request).finish(),
            Self::Other(value) => f.debug_tuple("Other").field(&value.to_string()).finish(),
        }
    }
}

impl From<&str> for RequestInfo {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for RequestInfo {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<Request> for RequestInfo {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

impl From<Url> for RequestInfo {
    fn from(url: Url) -> Self {
        Self::other(url)
    }
}

/// Second argument of `fetch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInit {
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestInit {
    pub fn method(method: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

// ============================================================================
// XMLHttpRequest.open arguments
// ============================================================================

/// Arguments of an `open` call on a request object.
///
/// Forwarded to the wrapped `open` exactly as received, including
/// an omitted `async_flag` and any `extra` trailing arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenArgs {
    pub method: String,
    pub target: Target,
    pub async_flag: Option<bool>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub extra: Vec<serde_json::Value>,
}

impl OpenArgs {
    pub fn new(method: impl Into<String>, target: impl Into<Target>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            async_flag: None,
            user: None,
            password: None,
            extra: Vec::new(),
        }
    }

    pub fn with_async(mut self, async_flag: bool) -> Self {
        self.async_flag = Some(async_flag);
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_extra(mut self, value: serde_json::Value) -> Self {
        self.extra.push(value);
        self
    }

    /// Whether the request is asynchronous; `true` when the flag is omitted.
    pub fn is_async(&self) -> bool {
        self.async_flag.unwrap_or(true)
    }
}

// ============================================================================
// Observation pipeline
// ============================================================================

/// Which entry point issued a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiKind {
    XmlHttpRequest,
    Fetch,
    WebSocket,
}

impl ApiKind {
    pub const ALL: [ApiKind; 3] = [Self::XmlHttpRequest, Self::Fetch, Self::WebSocket];

    /// Label used in diagnostic log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::XmlHttpRequest => "XMLHttpRequest",
            Self::Fetch => "fetch",
            Self::WebSocket => "WebSocket",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One intercepted invocation, alive for a single pipeline pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedCall {
    pub api: ApiKind,
    pub method: String,
    pub raw_target: Target,
    pub timestamp: DateTime<Utc>,
}

impl ObservedCall {
    /// Observe a call now.
    pub fn new(api: ApiKind, method: impl Into<String>, raw_target: impl Into<Target>) -> Self {
        Self {
            api,
            method: method.into(),
            raw_target: raw_target.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Scheme and host (and non-default port) of a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalOrigin(String);

impl CanonicalOrigin {
    /// Derive the origin of an absolute URL; `None` for opaque origins.
    pub fn from_url(url: &Url) -> Option<Self> {
        let origin = url.origin();
        if !origin.is_tuple() {
            return None;
        }
        Some(Self(origin.ascii_serialization()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON body posted to the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub app_version: String,
    pub app_environment: String,
    pub sdk: String,
    pub url: String,
    pub method: String,
    pub timestamp: String,
}

impl ReportPayload {
    pub fn new(
        app_version: impl Into<String>,
        app_environment: impl Into<String>,
        origin: &CanonicalOrigin,
        method: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            app_version: app_version.into(),
            app_environment: app_environment.into(),
            sdk: SDK_IDENTIFIER.to_string(),
            url: origin.to_string(),
            method: method.into(),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
