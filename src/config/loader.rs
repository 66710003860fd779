// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from files and the environment.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::{ConfigFile, SentinelOptionsPartial};

/// Config file names to search for (in order).
pub const CONFIG_FILES: &[&str] = &[".sentinel.json", ".sentinel.yaml", "sentinel.config.json"];

/// Global config directory name.
pub const GLOBAL_CONFIG_DIR: &str = ".request-sentinel";

/// Global config file name.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

pub const ENV_API_KEY: &str = "REQUEST_SENTINEL_API_KEY";
pub const ENV_APP_VERSION: &str = "REQUEST_SENTINEL_APP_VERSION";
pub const ENV_APP_ENVIRONMENT: &str = "REQUEST_SENTINEL_APP_ENVIRONMENT";
pub const ENV_COLLECTOR_URL: &str = "REQUEST_SENTINEL_COLLECTOR_URL";
pub const ENV_DEBUG: &str = "REQUEST_SENTINEL_DEBUG";

/// Get the global config file path.
pub fn get_global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Load global configuration from ~/.request-sentinel/config.json.
pub fn load_global_config() -> Result<Option<ConfigFile>, ConfigError> {
    let path = match get_global_config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    load_config_file(&path).map(Some)
}

/// Load workspace configuration, taking the first of [`CONFIG_FILES`] found.
pub fn load_workspace_config(workspace_root: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    for filename in CONFIG_FILES {
        let path = workspace_root.join(filename);
        if path.exists() {
            return load_config_file(&path).map(Some);
        }
    }
    Ok(None)
}

/// Load a configuration file (JSON or YAML).
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
        _ => serde_json::from_str(&content).map_err(ConfigError::from),
    }
}

/// Read configuration from the process environment.
pub fn load_env_config() -> Result<ConfigFile, ConfigError> {
    env_config_from(|name| std::env::var(name).ok())
}

/// Build a [`ConfigFile`] from an environment lookup function.
pub fn env_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigFile, ConfigError> {
    let debug = match lookup(ENV_DEBUG) {
        Some(raw) => Some(parse_bool(ENV_DEBUG, &raw)?),
        None => None,
    };

    Ok(ConfigFile {
        api_key: lookup(ENV_API_KEY),
        app_version: lookup(ENV_APP_VERSION),
        app_environment: lookup(ENV_APP_ENVIRONMENT),
        collector_url: lookup(ENV_COLLECTOR_URL),
        options: debug.map(|debug| SentinelOptionsPartial {
            debug: Some(debug),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::invalid(field, format!("expected a boolean, got {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_config_files_order() {
        assert_eq!(CONFIG_FILES.len(), 3);
        assert_eq!(CONFIG_FILES[0], ".sentinel.json");
    }

    #[test]
    fn test_global_config_path() {
        let path = get_global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().ends_with(".request-sentinel/config.json"));
    }

    #[test]
    fn test_load_workspace_config_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_workspace_config(temp.path());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_load_workspace_config_json() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".sentinel.json"),
            r#"{"apiKey": "abc", "appVersion": "2.0.0", "options": {"overrideFetch": false}}"#,
        )
        .unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.api_key, Some("abc".to_string()));
        assert_eq!(config.app_version, Some("2.0.0".to_string()));
        assert_eq!(config.options.unwrap().override_fetch, Some(false));
    }

    #[test]
    fn test_load_workspace_config_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".sentinel.yaml"),
            "apiKey: yaml-key\nappEnvironment: staging\ndocumentOrigin: https://app.example.com\n",
        )
        .unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.api_key, Some("yaml-key".to_string()));
        assert_eq!(config.app_environment, Some("staging".to_string()));
        assert_eq!(config.document_origin, Some("https://app.example.com".to_string()));
    }

    #[test]
    fn test_load_config_file_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".sentinel.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = load_config_file(&path);
        assert!(matches!(result, Err(ConfigError::JsonError(_))));
    }

    #[test]
    fn test_env_config() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_KEY, "env-key"),
            (ENV_COLLECTOR_URL, "http://localhost:4000"),
            (ENV_DEBUG, "true"),
        ]
        .into_iter()
        .collect();

        let config = env_config_from(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_key, Some("env-key".to_string()));
        assert_eq!(config.collector_url, Some("http://localhost:4000".to_string()));
        assert_eq!(config.options.unwrap().debug, Some(true));
        assert!(config.app_version.is_none());
    }

    #[test]
    fn test_env_config_bad_bool() {
        let result = env_config_from(|name| (name == ENV_DEBUG).then(|| "maybe".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
