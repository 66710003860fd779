// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for Request Sentinel.
//!
//! Handles loading, merging, and validation of configuration from multiple sources:
//! - Global config: ~/.request-sentinel/config.json
//! - Workspace config: .sentinel.json, .sentinel.yaml, or sentinel.config.json
//! - Environment: REQUEST_SENTINEL_* variables
//! - Init arguments: the values passed to `init`
//!
//! Configuration is merged with precedence (init > env > workspace > global > defaults).
//! The resolved [`SentinelConfig`] is immutable for the lifetime of a context.

mod loader;
mod merger;
mod types;

pub use loader::{
    env_config_from, get_global_config_path, load_config_file, load_env_config,
    load_global_config, load_workspace_config, CONFIG_FILES, ENV_API_KEY, ENV_APP_ENVIRONMENT,
    ENV_APP_VERSION, ENV_COLLECTOR_URL, ENV_DEBUG, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE,
};

pub use merger::{merge_config, InitOptions};

pub use types::{
    default_collector_url, ConfigFile, SentinelConfig, SentinelOptions, SentinelOptionsPartial,
    DEFAULT_COLLECTOR_URL, DEFAULT_REPORT_TIMEOUT_MS, INGEST_PATH,
};

use crate::error::ConfigError;
use std::path::Path;

/// Load and merge all configuration sources for a workspace.
pub fn load_config(workspace_root: &Path, init: InitOptions) -> Result<SentinelConfig, ConfigError> {
    load_config_from(
        load_global_config()?,
        workspace_root,
        |name| std::env::var(name).ok(),
        init,
    )
}

fn load_config_from(
    global: Option<ConfigFile>,
    workspace_root: &Path,
    env_lookup: impl Fn(&str) -> Option<String>,
    init: InitOptions,
) -> Result<SentinelConfig, ConfigError> {
    let workspace = load_workspace_config(workspace_root)?;
    let env = env_config_from(env_lookup)?;

    merge_config(global, workspace, Some(env), init)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_with_workspace_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".sentinel.json"),
            r#"{"appVersion": "3.1.4", "appEnvironment": "staging"}"#,
        )
        .unwrap();

        let init = InitOptions {
            api_key: Some("explicit".to_string()),
            ..Default::default()
        };
        let config = load_config_from(None, temp.path(), |_| None, init).unwrap();
        assert_eq!(config.api_key, "explicit");
        assert_eq!(config.app_version, "3.1.4");
    }

    #[test]
    fn test_load_config_init_overrides_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".sentinel.json"),
            r#"{"apiKey": "from-file", "appVersion": "1.0.0"}"#,
        )
        .unwrap();

        let init = InitOptions::new("from-init", "2.0.0", "prod");
        let config = load_config_from(None, temp.path(), |_| None, init).unwrap();
        assert_eq!(config.api_key, "from-init");
        assert_eq!(config.app_version, "2.0.0");
        assert_eq!(config.app_environment, "prod");
    }

    #[test]
    fn test_load_config_layer_precedence() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".sentinel.json"),
            r#"{"apiKey": "workspace-key", "appVersion": "1.0.0", "appEnvironment": "staging"}"#,
        )
        .unwrap();

        let global = ConfigFile {
            api_key: Some("global-key".to_string()),
            collector_url: Some("https://collector.internal".to_string()),
            ..Default::default()
        };
        let env = |name: &str| (name == ENV_APP_ENVIRONMENT).then(|| "from-env".to_string());

        let config = load_config_from(Some(global), temp.path(), env, InitOptions::default()).unwrap();
        assert_eq!(config.api_key, "workspace-key");
        assert_eq!(config.app_environment, "from-env");
        assert!(config.is_collector_target("https://collector.internal"));
    }
}
