use serde::Deserialize;
use std::env::vars;

/// Default server address used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    pub api_base_url: String,
    /// Django CSRF token.
    ///
    /// When present, mutating requests send it via the `X-CSRFToken` header.
    pub csrf_token: Option<String>,
    /// Size of the upload preview surface in pixels.
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    /// Quiet period for search-as-you-type.
    pub search_debounce_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid HANNOU_* environment: {0}")]
    Env(String),
}

/// Optional overrides read from `HANNOU_*` environment variables.
#[derive(Debug, Default, Deserialize)]
struct RawEnvConfig {
    hannou_api_base_url: Option<String>,
    hannou_csrf_token: Option<String>,
    hannou_thumbnail_width: Option<u32>,
    hannou_thumbnail_height: Option<u32>,
    hannou_search_debounce_ms: Option<u64>,
}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.csrf_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Defaults overlaid with whatever `HANNOU_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// `self` overlaid with whatever `HANNOU_*` variables are set.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        let raw: RawEnvConfig =
            serde_env::from_iter(vars()).map_err(|e| ConfigError::Env(e.to_string()))?;
        Ok(self.apply_env(raw))
    }

    fn apply_env(mut self, raw: RawEnvConfig) -> Self {
        let RawEnvConfig {
            hannou_api_base_url,
            hannou_csrf_token,
            hannou_thumbnail_width,
            hannou_thumbnail_height,
            hannou_search_debounce_ms,
        } = raw;

        if let Some(url) = hannou_api_base_url {
            log::debug!("Using HANNOU_API_BASE_URL: {url}");
            self.api_base_url = url;
        }
        if let Some(token) = hannou_csrf_token {
            self = self.with_csrf_token(token);
        }
        if let Some(width) = hannou_thumbnail_width {
            self.thumbnail_width = width.max(1);
        }
        if let Some(height) = hannou_thumbnail_height {
            self.thumbnail_height = height.max(1);
        }
        if let Some(ms) = hannou_search_debounce_ms {
            self.search_debounce_ms = ms;
        }
        self
    }

    /// Base of the REST API, e.g. `http://host/api`, or `/api` for an empty base.
    pub fn api_url(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        if base.is_empty() {
            "/api".to_owned()
        } else {
            format!("{base}/api")
        }
    }

    /// Resolves an asset URL returned by the server (often `/media/...`)
    /// against the configured base.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_owned()
        } else {
            let base = self.api_base_url.trim_end_matches('/');
            let path = url.trim_start_matches('/');
            format!("{base}/{path}")
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            csrf_token: None,
            thumbnail_width: 200,
            thumbnail_height: 200,
            search_debounce_ms: 300,
        }
    }
}

/// Cookie Django keeps the CSRF token in.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Returns the value of cookie `name` from a `Cookie` header string, or an
/// empty string when absent.
pub fn csrf_from_cookie(cookie_header: &str, name: &str) -> String {
    let value = format!("; {cookie_header}");
    let parts: Vec<&str> = value.split(&format!("; {name}=")).collect();
    if parts.len() == 2 {
        parts[1].split(';').next().unwrap_or_default().to_owned()
    } else {
        String::new()
    }
}
