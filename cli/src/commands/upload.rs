//! Upload command: the upload form driven from the terminal.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use hannou_business::{AppController, PasteHub};
use hannou_input::{ClipboardProvider, LocalFile};
use tracing::{info, instrument};

use crate::context::finish;
use crate::output::Output;

/// Inputs of one upload.
#[derive(Debug, Default)]
pub struct UploadArgs {
    pub file: Option<PathBuf>,
    pub text: Option<String>,
    pub thumbnail: Option<PathBuf>,
}

/// Selects `args.file`, or pastes the clipboard when no file is given, then
/// submits the form.
#[instrument(skip_all, name = "upload", fields(from_file = args.file.is_some()))]
pub async fn run_upload<C>(app: &mut AppController, clipboard: &C, args: UploadArgs) -> Result<()>
where
    C: ClipboardProvider + ?Sized,
{
    let out = Output::new();
    let hub = PasteHub::new();
    app.mount(&hub).await;

    if let Some(path) = &args.file {
        let file = LocalFile::from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        app.select_file(file).await;
    } else {
        let payload = clipboard
            .read_paste()
            .context("Failed to read the clipboard")?;
        info!(files = payload.files.len(), has_text = payload.text().is_some(), "pasted");
        hub.dispatch(payload);
        app.pump_events().await;
        if let Some(file) = app.selected_file() {
            out.clipboard(&file.name, &file.mime_type);
        }
    }

    // An explicit caption beats pasted text.
    if let Some(text) = args.text {
        app.set_caption(text);
    }

    if let Some(path) = &args.thumbnail {
        let png = app.thumbnail().canvas().to_png()?;
        std::fs::write(path, png)
            .with_context(|| format!("Failed to write preview {}", path.display()))?;
        out.dim(format!("Preview written to {}", path.display()));
    }

    let before = app.gallery().len();
    app.upload().await;
    app.unmount(&hub);
    finish(app)?;

    if app.gallery().len() > before {
        if let Some(item) = app.item(0) {
            out.success(format!("Uploaded {}", item.id()));
            out.labeled_indent("Tags", item.record().tag_text(), 2);
        }
    }
    Ok(())
}
