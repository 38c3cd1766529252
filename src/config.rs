//! Backend endpoint configuration. The API base URL is resolved from, in
//! order: the `--api-base` flag, the `ASKR_API_URL` environment variable,
//! `~/.askr/config.toml`, and finally a build-profile default (a local
//! backend in debug builds, the production fallback otherwise).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Backend used by debug builds when nothing else is configured.
pub const DEV_API_BASE: &str = "http://127.0.0.1:8000";

/// Production fallback when no backend host is configured.
pub const FALLBACK_API_BASE: &str = "https://askr-backend.fly.dev";

/// Environment variable overriding the configured backend.
pub const API_URL_ENV: &str = "ASKR_API_URL";

/// On-disk configuration (`~/.askr/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Base URL of the answering backend.
    pub api_base: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
}

impl Config {
    /// Resolve the configuration, with `flag` being the command-line override.
    pub fn resolve(flag: Option<String>) -> Result<Self> {
        let file_value = match config_path() {
            Some(path) if path.exists() => ConfigFile::load(&path)?.api_base,
            _ => None,
        };
        let api_base = resolve_api_base(flag, std::env::var(API_URL_ENV).ok(), file_value);
        Ok(Self { api_base })
    }

    /// The streaming ask endpoint.
    pub fn ask_url(&self) -> String {
        format!("{}/api/ask", self.api_base)
    }

    /// Backend interactive documentation.
    pub fn docs_url(&self) -> String {
        format!("{}/docs", self.api_base)
    }

    /// Backend schema endpoint, served next to the docs.
    pub fn openapi_url(&self) -> String {
        format!("{}/openapi.json", self.api_base)
    }
}

/// Default config file location: `~/.askr/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".askr").join("config.toml"))
}

/// Pick the API base from the first populated source. Trailing slashes are
/// stripped so endpoint paths join cleanly.
pub fn resolve_api_base(
    flag: Option<String>,
    env: Option<String>,
    file: Option<String>,
) -> String {
    flag.or(env)
        .or(file)
        .unwrap_or_else(|| default_api_base().to_string())
        .trim_end_matches('/')
        .to_string()
}

fn default_api_base() -> &'static str {
    if cfg!(debug_assertions) {
        DEV_API_BASE
    } else {
        FALLBACK_API_BASE
    }
}
