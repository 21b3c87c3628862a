//! Per-image controller: inline tag editing, delete and copy-to-clipboard.
//!
//! An item is `Active` until its tag editor gains focus (`EditingTags`) and
//! returns to `Active` when the editor loses focus. A successful delete moves
//! it to `Deleted` for good; the record stays in the gallery as a placeholder
//! and every later action on it is a no-op.

use hannou_input::{ClipboardError, ClipboardImage, ClipboardProvider};

use crate::api::{ApiError, ImageApi};
use crate::models::{ImageRecord, UploadResult, split_tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Active,
    EditingTags,
    Deleted,
}

/// Keys the tag editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    /// Commits the edit.
    Enter,
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("failed to download image: {0}")]
    Fetch(#[from] ApiError),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("error converting image to png: {0}")]
    Encode(String),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// The editable tag surface of one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEditor {
    text: String,
    focused: bool,
}

impl TagEditor {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

#[derive(Debug, Clone)]
pub struct GalleryItem {
    record: ImageRecord,
    id: String,
    editor: TagEditor,
}

impl GalleryItem {
    pub fn new(record: ImageRecord) -> Self {
        let id = record.image_id().to_owned();
        let editor = TagEditor {
            text: record.tag_text(),
            focused: false,
        };
        Self { record, id, editor }
    }

    pub fn record(&self) -> &ImageRecord {
        &self.record
    }

    /// Identity derived from the URL at creation; survives deletion.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn editor(&self) -> &TagEditor {
        &self.editor
    }

    pub fn state(&self) -> ItemState {
        if self.record.is_deleted() {
            ItemState::Deleted
        } else if self.editor.focused {
            ItemState::EditingTags
        } else {
            ItemState::Active
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.record.is_deleted()
    }

    /// Puts the tag editor in focus. Ignored once deleted.
    pub fn focus_tags(&mut self) {
        if !self.is_deleted() {
            self.editor.focused = true;
        }
    }

    /// Replaces the editor contents, as typing would.
    pub fn edit_tags(&mut self, text: impl Into<String>) {
        if self.is_deleted() {
            return;
        }
        self.editor.text = text.into();
        self.editor.focused = true;
    }

    /// Drops focus and resyncs the editor with the record.
    pub fn blur(&mut self) {
        self.editor.focused = false;
        self.editor.text = self.record.tag_text();
    }

    /// Returns `true` when `key` should commit the edit.
    pub fn on_key(&self, key: EditKey) -> bool {
        key == EditKey::Enter && self.state() == ItemState::EditingTags
    }

    /// Sends the editor text as the new tags.
    ///
    /// Focus is dropped whatever the outcome. On success the record's tags are
    /// split the way the server stores them. Returns `Ok(None)` for a deleted
    /// item.
    pub async fn commit_tags<A>(&mut self, api: &A) -> Result<Option<UploadResult>, ApiError>
    where
        A: ImageApi + ?Sized,
    {
        if self.is_deleted() {
            return Ok(None);
        }

        let text = self.editor.text.clone();
        let result = api.update_tags(&self.id, &text).await;
        match &result {
            Ok(UploadResult::Success { .. }) => self.record.tags = split_tags(&text),
            Ok(UploadResult::Failure(errors)) => {
                log::warn!("tag update for {} rejected: {errors:?}", self.id);
            }
            Err(e) => log::error!("tag update for {} failed: {e}", self.id),
        }
        self.blur();
        result.map(Some)
    }

    /// Deletes the image and marks the record in place.
    ///
    /// Returns `Ok(None)` without calling the server if already deleted.
    pub async fn delete<A>(&mut self, api: &A) -> Result<Option<UploadResult>, ApiError>
    where
        A: ImageApi + ?Sized,
    {
        if self.is_deleted() {
            return Ok(None);
        }

        let result = api.delete_image(&self.id).await.inspect_err(|e| {
            log::error!("delete of {} failed: {e}", self.id);
        })?;
        if result.is_success() {
            self.record.mark_deleted();
            self.blur();
        }
        Ok(Some(result))
    }

    /// Puts the image on the clipboard as PNG, whatever format it is stored in.
    ///
    /// Returns `Ok(false)` for a deleted item.
    pub async fn copy<A, C>(&self, api: &A, clipboard: &C) -> Result<bool, CopyError>
    where
        A: ImageApi + ?Sized,
        C: ClipboardProvider + Sync + ?Sized,
    {
        if self.is_deleted() {
            return Ok(false);
        }

        let bytes = api.fetch_image(&self.record.image_url).await?;
        let image = to_png_clipboard_image(&bytes, &self.id).inspect_err(|e| {
            log::error!("copy of {} failed: {e}", self.id);
        })?;
        clipboard.set_image(&image)?;
        log::debug!("copied {} ({}x{}) to clipboard", self.id, image.width, image.height);
        Ok(true)
    }
}

fn to_png_clipboard_image(bytes: &[u8], id: &str) -> Result<ClipboardImage, CopyError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| CopyError::Decode(e.to_string()))?;

    let mut cursor = std::io::Cursor::new(Vec::new());
    decoded
        .write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| CopyError::Encode(e.to_string()))?;

    let stem = id.rsplit_once('.').map_or(id, |(stem, _)| stem);
    Ok(ClipboardImage {
        width: decoded.width() as usize,
        height: decoded.height() as usize,
        bytes: cursor.into_inner(),
        mime_type: "image/png".to_owned(),
        filename: format!("{stem}.png"),
    })
}
