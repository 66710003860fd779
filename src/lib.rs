// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Request Sentinel - observe where an application talks to.
//!
//! Request Sentinel wraps the network entry points of a host application,
//! notes the origin of every outgoing call, and reports each distinct origin
//! once to a remote collector. Reporting never blocks, fails, or alters the
//! host's own calls.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`types`] - Core type definitions (targets, fetch inputs, payloads)
//! - [`error`] - Error types and result aliases
//! - [`config`] - Configuration loading and merging
//! - [`intercept`] - Entry-point traits, the observing wrapper, installation
//! - [`dedup`] - Canonical origins and at-most-once admission
//! - [`reporter`] - Fire-and-forget delivery to the collector
//! - [`sentinel`] - Contexts and the process-wide singleton
//! - [`telemetry`] - Tracing setup, metrics and spans
//!
//! # Example
//!
//! ```rust,ignore
//! use request_sentinel::{init, NetworkApis, ReqwestFetch, SentinelOptions};
//!
//! let sentinel = init("api-key", "1.4.0", "production", SentinelOptions::default())?;
//!
//! let mut apis = NetworkApis::new(my_xhr, ReqwestFetch::default(), my_socket);
//! sentinel.install(&mut apis);
//!
//! // Every call through `apis` is now observed.
//! let response = apis.fetch.fetch("https://api.example.com/users".into(), None).await?;
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod intercept;
pub mod reporter;
pub mod sentinel;
pub mod telemetry;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{InitOptions, SentinelConfig, SentinelOptions};
pub use dedup::OriginDeduplicator;
pub use error::{ConfigError, FetchError, ReportError, Result, SentinelError, TargetError};
pub use intercept::{
    wrap, Fetch, InterceptionRegistry, InterceptionState, NetworkApis, Observed, Observer,
    ReqwestFetch, SocketConstructor, XhrOpen,
};
pub use reporter::{HttpTransport, IngestRequest, TelemetryReporter, Transport};
pub use sentinel::{get, init, init_from_workspace, init_with_config, Sentinel, SentinelContext};
pub use types::{
    ApiKind, CanonicalOrigin, ObservedCall, OpenArgs, ReportPayload, Request, RequestInfo,
    RequestInit, Target,
};

/// Request Sentinel version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
