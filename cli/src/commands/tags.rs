//! Tag reference listing.

use anyhow::Result;
use hannou_business::AppController;
use tracing::instrument;

use crate::context::finish;
use crate::output::Output;

#[instrument(skip_all, name = "tags", fields(imageless))]
pub async fn run_tags(app: &mut AppController, imageless: bool) -> Result<()> {
    let out = Output::new();

    if imageless {
        app.show_imageless_tags().await;
    } else {
        app.refresh_tags().await;
    }

    finish(app)?;
    out.tags(app.tags());
    Ok(())
}
