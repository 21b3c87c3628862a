//! Controller construction and the shared end-of-command check.

use anyhow::{Result, bail};
use hannou_business::{AppController, BusinessConfig, HttpImageApi};
use tracing::instrument;

/// Builds a root controller talking to the configured server.
#[instrument(skip_all, fields(base_url = %config.api_base_url))]
pub fn build_controller(config: &BusinessConfig) -> AppController {
    AppController::new(HttpImageApi::shared(config.clone()), config)
}

/// Fails with the error slot's contents if it is not empty.
pub fn finish(app: &AppController) -> Result<()> {
    if app.has_error() {
        bail!("{}", app.error().trim_end());
    }
    Ok(())
}

/// Finds the gallery index of `id`, loading the gallery first.
#[instrument(skip_all, fields(%id))]
pub async fn locate(app: &mut AppController, id: &str) -> Result<usize> {
    app.fetch_images().await;
    if app.has_error() {
        bail!("{}", app.error());
    }
    match app.position(id) {
        Some(index) => Ok(index),
        None => bail!("No image with id {id}"),
    }
}
