//! Gallery listing and search commands.

use anyhow::Result;
use hannou_business::{AppController, PasteHub};
use tracing::instrument;

use crate::context::finish;
use crate::output::Output;

#[instrument(skip_all, name = "list", fields(tagless))]
pub async fn run_list(app: &mut AppController, tagless: bool) -> Result<()> {
    let out = Output::new();
    let hub = PasteHub::new();

    app.mount(&hub).await;
    if tagless && !app.has_error() {
        app.show_tagless().await;
    }
    app.unmount(&hub);

    finish(app)?;
    out.gallery(app.gallery());
    Ok(())
}

#[instrument(skip_all, name = "search", fields(query = %query))]
pub async fn run_search(app: &mut AppController, query: String) -> Result<()> {
    let out = Output::new();

    app.set_search_query(query);
    app.search().await;

    finish(app)?;
    out.gallery(app.gallery());
    Ok(())
}
