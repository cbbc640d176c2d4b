//! Client configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the platform HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the platform backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Load configuration from the well-known paths.
///
/// Search order:
/// 1. `leveltest.toml` in the current directory
/// 2. `~/.config/leveltest/config.toml`
///
/// Environment variable override: `LEVELTEST_API_URL`.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("leveltest.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = dirs_path() {
            let global = dir.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClientConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClientConfig::default(),
    };

    if let Ok(url) = std::env::var("LEVELTEST_API_URL") {
        config.base_url = url;
    }
    // A trailing slash would double up when endpoints are appended.
    while config.base_url.ends_with('/') {
        config.base_url.pop();
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("LEVELTEST_HOME") {
        return Some(PathBuf::from(home));
    }
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("leveltest"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn parse_partial_config_fills_defaults() {
        let config: ClientConfig = toml::from_str(r#"base_url = "https://api.example.org""#).unwrap();
        assert_eq!(config.base_url, "https://api.example.org");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn explicit_path_loads_and_trims_trailing_slash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leveltest.toml");
        std::fs::write(
            &path,
            "base_url = \"https://api.example.org/\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.base_url, "https://api.example.org");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        assert!(load_config_from(Some(Path::new("no/such/file.toml"))).is_err());
    }
}
