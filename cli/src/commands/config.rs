//! Persisting server settings.

use std::path::Path;

use anyhow::Result;
use tracing::instrument;

use crate::config::Config;
use crate::output::Output;

/// Stores the given settings in the config file at `path`, keeping the
/// ones not given. With nothing given, prints the current settings.
#[instrument(skip_all, name = "config")]
pub fn run_config(path: &Path, base_url: Option<String>, csrf_token: Option<String>) -> Result<()> {
    let out = Output::new();
    let mut config = Config::load_from(path)?;

    if base_url.is_none() && csrf_token.is_none() {
        out.info(format!("Config file: {}", path.display()));
        out.labeled_indent(
            "base_url",
            config.server.base_url.as_deref().unwrap_or("(default)"),
            2,
        );
        out.labeled_indent(
            "csrf_token",
            if config.server.csrf_token.is_some() { "(set)" } else { "(unset)" },
            2,
        );
        return Ok(());
    }

    if base_url.is_some() {
        config.server.base_url = base_url;
    }
    if let Some(token) = csrf_token {
        config.server.csrf_token = (!token.is_empty()).then_some(token);
    }
    config.save_to(path)?;

    out.success(format!("Saved {}", path.display()));
    Ok(())
}
