//! Commands acting on one gallery item: tag, delete, copy.

use anyhow::{Result, bail};
use hannou_business::{AppController, EditKey};
use hannou_input::ClipboardProvider;
use tracing::instrument;

use crate::context::{finish, locate};
use crate::output::Output;

/// Types `tags` into the item's tag editor and commits with Enter.
#[instrument(skip_all, name = "tag", fields(%id))]
pub async fn run_tag(app: &mut AppController, id: &str, tags: String) -> Result<()> {
    let out = Output::new();
    let index = locate(app, id).await?;

    let Some(item) = app.item_mut(index) else {
        bail!("No image with id {id}");
    };
    if item.is_deleted() {
        out.dim(format!("{id} is deleted"));
        return Ok(());
    }
    item.focus_tags();
    item.edit_tags(tags);
    if item.on_key(EditKey::Enter) {
        app.commit_tags(index).await;
    }
    finish(app)?;

    if let Some(item) = app.item(index) {
        out.success(format!("Tagged {id}"));
        out.labeled_indent("Tags", item.record().tag_text(), 2);
    }
    Ok(())
}

#[instrument(skip_all, name = "delete", fields(%id))]
pub async fn run_delete(app: &mut AppController, id: &str) -> Result<()> {
    let out = Output::new();
    let index = locate(app, id).await?;

    app.delete(index).await;
    finish(app)?;

    out.success(format!("Deleted {id}"));
    Ok(())
}

#[instrument(skip_all, name = "copy", fields(%id))]
pub async fn run_copy<C>(app: &mut AppController, clipboard: &C, id: &str) -> Result<()>
where
    C: ClipboardProvider + Sync + ?Sized,
{
    let out = Output::new();
    let index = locate(app, id).await?;

    let copied = app.copy(index, clipboard).await;
    finish(app)?;

    if copied {
        out.success(format!("Copied {id} to the clipboard as PNG"));
    } else {
        out.dim(format!("{id} is deleted"));
    }
    Ok(())
}
