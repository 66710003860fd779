// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for Request Sentinel.
//!
//! None of these ever reach the host application through an intercepted call.
//! Errors on the observation path end in a `tracing` diagnostic; only setup
//! (configuration loading, context construction) returns them to the caller.

use thiserror::Error;

/// Errors resolving the raw target of an observed call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("Malformed target {target:?}: {reason}")]
    Malformed { target: String, reason: String },

    #[error("Relative target {0:?} with no document origin to resolve against")]
    RelativeWithoutBase(String),

    #[error("Target {0:?} has an opaque origin")]
    OpaqueOrigin(String),
}

impl TargetError {
    /// Create a malformed-target error.
    pub fn malformed(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors delivering a report to the collector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Collector answered with unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("Payload serialization error: {0}")]
    Serialization(String),

    #[error("Report dispatcher is no longer running")]
    DispatcherClosed,
}

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors from the reqwest-backed fetch adapter.
///
/// These belong to the host's own request and are returned to it unchanged
/// by the observing wrapper.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl ConfigError {
    /// Create an invalid-value error for a named field.
    pub fn invalid(field: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Errors building a sentinel context.
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No tokio runtime available to run the report dispatcher")]
    NoRuntime,

    #[error("Failed to build transport: {0}")]
    Transport(String),
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;
