//! Configuration file handling for the CLI.
//!
//! Stores server settings in `$XDG_CONFIG_HOME/hannou/config.toml` following
//! the XDG Base Directory Specification.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use hannou_business::{BusinessConfig, CSRF_COOKIE_NAME, csrf_from_cookie};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration stored on disk
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub csrf_token: Option<String>,
}

impl Config {
    /// Get the configuration file path.
    ///
    /// Returns `$XDG_CONFIG_HOME/hannou/config.toml` on Linux,
    /// appropriate paths on other platforms.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("org", "hannou", "hannou")
            .context("Failed to determine config directory")?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`.
    ///
    /// Returns default configuration if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to `path`, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Overlays the saved server settings onto `config`.
    pub fn apply(&self, mut config: BusinessConfig) -> BusinessConfig {
        if let Some(url) = &self.server.base_url {
            config.api_base_url.clone_from(url);
        }
        if let Some(token) = &self.server.csrf_token {
            config = config.with_csrf_token(token.as_str());
        }
        config
    }
}

/// Settings given on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub base_url: Option<&'a str>,
    pub csrf_token: Option<&'a str>,
    /// Browser `Cookie` header; its `csrftoken` value is used when no token
    /// is given directly.
    pub cookie: Option<&'a str>,
}

impl Overrides<'_> {
    fn token(&self) -> Option<String> {
        if let Some(token) = self.csrf_token {
            return Some(token.to_owned());
        }
        self.cookie
            .map(|cookie| csrf_from_cookie(cookie, CSRF_COOKIE_NAME))
            .filter(|token| !token.is_empty())
    }
}

/// Effective settings: flag, then `HANNOU_*` environment, then config file,
/// then built-in defaults.
pub fn resolve(file: &Config, overrides: Overrides<'_>) -> Result<BusinessConfig> {
    let mut config = file
        .apply(BusinessConfig::default())
        .with_env()
        .context("Failed to read HANNOU_* environment")?;

    if let Some(url) = overrides.base_url {
        config.api_base_url = url.to_owned();
    }
    if let Some(token) = overrides.token() {
        config = config.with_csrf_token(token);
    }
    Ok(config)
}
