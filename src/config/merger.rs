// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging configurations from different sources with proper precedence.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

use super::types::{
    default_collector_url, ConfigFile, SentinelConfig, SentinelOptions, DEFAULT_REPORT_TIMEOUT_MS,
};

/// Arguments passed explicitly to `init`; these override every other source.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub api_key: Option<String>,
    pub app_version: Option<String>,
    pub app_environment: Option<String>,
    pub options: Option<SentinelOptions>,
    pub collector_url: Option<String>,
    pub document_origin: Option<String>,
}

impl InitOptions {
    pub fn new(
        api_key: impl Into<String>,
        app_version: impl Into<String>,
        app_environment: impl Into<String>,
    ) -> Self {
        Self {
            api_key: Some(api_key.into()),
            app_version: Some(app_version.into()),
            app_environment: Some(app_environment.into()),
            ..Default::default()
        }
    }
}

/// Merge multiple configurations with precedence and resolve the result.
///
/// Precedence (highest to lowest):
/// 1. Explicit init arguments
/// 2. Environment variables
/// 3. Workspace config (.sentinel.json)
/// 4. Global config (~/.request-sentinel/config.json)
/// 5. Default values
pub fn merge_config(
    global: Option<ConfigFile>,
    workspace: Option<ConfigFile>,
    env: Option<ConfigFile>,
    init: InitOptions,
) -> Result<SentinelConfig, ConfigError> {
    let mut merged = ConfigFile::default();
    let mut options = SentinelOptions::default();

    for layer in [global, workspace, env].into_iter().flatten() {
        apply_layer(&mut merged, &mut options, layer);
    }

    apply_init_options(&mut merged, &mut options, init);

    resolve(merged, options)
}

fn apply_layer(result: &mut ConfigFile, options: &mut SentinelOptions, layer: ConfigFile) {
    if layer.api_key.is_some() {
        result.api_key = layer.api_key;
    }
    if layer.app_version.is_some() {
        result.app_version = layer.app_version;
    }
    if layer.app_environment.is_some() {
        result.app_environment = layer.app_environment;
    }
    if layer.collector_url.is_some() {
        result.collector_url = layer.collector_url;
    }
    if layer.document_origin.is_some() {
        result.document_origin = layer.document_origin;
    }
    if layer.report_timeout_ms.is_some() {
        result.report_timeout_ms = layer.report_timeout_ms;
    }
    if let Some(ref partial) = layer.options {
        partial.apply_to(options);
    }
}

fn apply_init_options(result: &mut ConfigFile, options: &mut SentinelOptions, init: InitOptions) {
    if init.api_key.is_some() {
        result.api_key = init.api_key;
    }
    if init.app_version.is_some() {
        result.app_version = init.app_version;
    }
    if init.app_environment.is_some() {
        result.app_environment = init.app_environment;
    }
    if init.collector_url.is_some() {
        result.collector_url = init.collector_url;
    }
    if init.document_origin.is_some() {
        result.document_origin = init.document_origin;
    }
    if let Some(explicit) = init.options {
        *options = explicit;
    }
}

fn resolve(merged: ConfigFile, options: SentinelOptions) -> Result<SentinelConfig, ConfigError> {
    let collector_url = match merged.collector_url {
        Some(raw) => parse_url("collectorUrl", &raw)?,
        None => default_collector_url(),
    };

    let document_origin = merged
        .document_origin
        .map(|raw| parse_url("documentOrigin", &raw))
        .transpose()?;

    // No layer named a key at all; an explicit empty one is still a key.
    let api_key = merged
        .api_key
        .ok_or_else(|| ConfigError::MissingField("apiKey".to_string()))?;

    let config = SentinelConfig {
        api_key,
        app_version: merged.app_version.unwrap_or_default(),
        app_environment: merged.app_environment.unwrap_or_default(),
        options,
        collector_url,
        document_origin,
        report_timeout: Duration::from_millis(
            merged.report_timeout_ms.unwrap_or(DEFAULT_REPORT_TIMEOUT_MS),
        ),
    };

    config.validate()?;
    Ok(config)
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::invalid(field, e))
}
