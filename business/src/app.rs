//! Application root controller.
//!
//! Owns everything the page shows: the gallery, the upload form (selected
//! file, file input, caption, preview), the search box, the tag list and the
//! single error slot. User events come in as method calls; every async action
//! catches its own failure and reports it through [`AppController::error`].

use std::time::Duration;

use hannou_input::{ClipboardProvider, LocalFile, PastePayload};

use crate::api::{ApiError, SharedApi};
use crate::config::BusinessConfig;
use crate::debounce::{AsyncDebounced, DebounceError, SharedCall, debounce_async};
use crate::gallery_item::{CopyError, GalleryItem};
use crate::models::{ImageRecord, TagRecord, UploadResult};
use crate::paste::{PasteAction, PasteHub, PasteSubscription, classify};
use crate::thumbnail::{DecodedThumbnail, RenderTicket, ThumbnailRenderer};

pub const NO_FILE_SELECTED: &str = "Please select or paste an image to upload";
pub const FETCH_IMAGES_FAILED: &str = "Failed to fetch images";
pub const UPLOAD_FAILED: &str = "Upload failed";
pub const FETCH_TAGS_FAILED: &str = "Failed to fetch tags";
pub const UPDATE_TAGS_FAILED: &str = "Failed to update tags";
pub const DELETE_FAILED: &str = "Failed to delete image";
pub const COPY_FAILED: &str = "Failed to copy image";

/// Result of a debounced search, shared by every caller that joined it.
pub type SearchCall = SharedCall<Vec<ImageRecord>, ApiError>;

pub struct AppController {
    api: SharedApi,
    gallery: Vec<GalleryItem>,
    tags: Vec<TagRecord>,
    selected_file: Option<LocalFile>,
    file_input: Vec<LocalFile>,
    caption: String,
    search_query: String,
    error: String,
    thumbnail: ThumbnailRenderer,
    subscription: Option<PasteSubscription>,
    search: AsyncDebounced<String, Vec<ImageRecord>, ApiError>,
}

impl std::fmt::Debug for AppController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppController")
            .field("gallery", &self.gallery.len())
            .field("selected_file", &self.selected_file.as_ref().map(|f| &f.name))
            .field("caption", &self.caption)
            .field("search_query", &self.search_query)
            .field("error", &self.error)
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

impl AppController {
    pub fn new(api: SharedApi, config: &BusinessConfig) -> Self {
        let search_api = SharedApi::clone(&api);
        let search = debounce_async(
            move |query: String| {
                let api = SharedApi::clone(&search_api);
                async move { api.search_images(&query).await }
            },
            Duration::from_millis(config.search_debounce_ms),
        );

        Self {
            api,
            gallery: Vec::new(),
            tags: Vec::new(),
            selected_file: None,
            file_input: Vec::new(),
            caption: String::new(),
            search_query: String::new(),
            error: String::new(),
            thumbnail: ThumbnailRenderer::new(config.thumbnail_width, config.thumbnail_height),
            subscription: None,
            search,
        }
    }

    pub fn gallery(&self) -> &[GalleryItem] {
        &self.gallery
    }

    pub fn item(&self, index: usize) -> Option<&GalleryItem> {
        self.gallery.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut GalleryItem> {
        self.gallery.get_mut(index)
    }

    /// Index of the item with the given image id.
    pub fn position(&self, image_id: &str) -> Option<usize> {
        self.gallery.iter().position(|item| item.id() == image_id)
    }

    pub fn tags(&self) -> &[TagRecord] {
        &self.tags
    }

    pub fn selected_file(&self) -> Option<&LocalFile> {
        self.selected_file.as_ref()
    }

    /// Mirror of the file input's file list.
    pub fn file_input(&self) -> &[LocalFile] {
        &self.file_input
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, text: impl Into<String>) {
        self.caption = text.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }

    pub fn thumbnail(&self) -> &ThumbnailRenderer {
        &self.thumbnail
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    // -- lifecycle -----------------------------------------------------------

    /// Registers the paste listener and loads the gallery.
    ///
    /// Mounting twice keeps the one existing listener.
    pub async fn mount(&mut self, hub: &PasteHub) {
        if self.subscription.is_none() {
            self.subscription = Some(hub.subscribe());
        }
        self.fetch_images().await;
    }

    /// Deregisters the paste listener. Pastes queued but not pumped are lost.
    pub fn unmount(&mut self, hub: &PasteHub) {
        if let Some(subscription) = self.subscription.take() {
            hub.unsubscribe(subscription.id());
        }
    }

    /// Handles every paste the hub delivered since the last pump. Returns how
    /// many were handled.
    pub async fn pump_events(&mut self) -> usize {
        let payloads = self
            .subscription
            .as_ref()
            .map(PasteSubscription::drain)
            .unwrap_or_default();
        let count = payloads.len();

        // Only the last selection's preview can survive, so decode just that.
        let mut ticket = None;
        for payload in payloads {
            if let Some(next) = self.on_paste(payload) {
                ticket = Some(next);
            }
        }
        if let Some(ticket) = ticket {
            self.render_thumbnail(ticket).await;
        }
        count
    }

    // -- loading -------------------------------------------------------------

    pub async fn fetch_images(&mut self) {
        match self.api.list_images().await {
            Ok(images) => self.replace_gallery(images),
            Err(e) => {
                log::error!("fetching images failed: {e}");
                self.error = FETCH_IMAGES_FAILED.to_owned();
            }
        }
    }

    /// Replaces the gallery with the images that have no tags.
    pub async fn show_tagless(&mut self) {
        match self.api.list_tagless_images().await {
            Ok(images) => {
                self.replace_gallery(images);
                self.error.clear();
            }
            Err(e) => {
                log::error!("fetching tagless images failed: {e}");
                self.error = FETCH_IMAGES_FAILED.to_owned();
            }
        }
    }

    pub async fn refresh_tags(&mut self) {
        match self.api.list_tags().await {
            Ok(tags) => self.tags = tags,
            Err(e) => {
                log::error!("fetching tags failed: {e}");
                self.error = FETCH_TAGS_FAILED.to_owned();
            }
        }
    }

    /// Replaces the tag list with the tags no image uses.
    pub async fn show_imageless_tags(&mut self) {
        match self.api.list_imageless_tags().await {
            Ok(tags) => self.tags = tags,
            Err(e) => {
                log::error!("fetching imageless tags failed: {e}");
                self.error = FETCH_TAGS_FAILED.to_owned();
            }
        }
    }

    fn replace_gallery(&mut self, images: Vec<ImageRecord>) {
        self.gallery = images.into_iter().map(GalleryItem::new).collect();
    }

    // -- upload form ---------------------------------------------------------

    /// Applies a paste to the form. Returns the preview render to run when a
    /// file was pasted.
    pub fn on_paste(&mut self, payload: PastePayload) -> Option<RenderTicket> {
        match classify(payload) {
            PasteAction::SelectFile { file, files } => {
                self.file_input = files;
                Some(self.select(file))
            }
            PasteAction::SetCaption(text) => {
                self.caption = text;
                None
            }
            PasteAction::Ignore => None,
        }
    }

    /// The user picked a file through the file input.
    pub fn on_file_selected(&mut self, file: LocalFile) -> RenderTicket {
        self.file_input = vec![file.clone()];
        self.select(file)
    }

    fn select(&mut self, file: LocalFile) -> RenderTicket {
        let ticket = self.thumbnail.begin(&file);
        log::debug!("selected {} ({} bytes)", file.name, file.len());
        self.selected_file = Some(file);
        ticket
    }

    /// Draws a finished decode if it still belongs to the current selection.
    pub fn apply_thumbnail(&mut self, decoded: DecodedThumbnail) -> bool {
        self.thumbnail.finish(decoded)
    }

    pub async fn render_thumbnail(&mut self, ticket: RenderTicket) -> bool {
        let decoded = ThumbnailRenderer::decode(ticket).await;
        self.apply_thumbnail(decoded)
    }

    /// [`Self::on_paste`] followed by the preview render.
    pub async fn paste(&mut self, payload: PastePayload) {
        if let Some(ticket) = self.on_paste(payload) {
            self.render_thumbnail(ticket).await;
        }
    }

    /// [`Self::on_file_selected`] followed by the preview render.
    pub async fn select_file(&mut self, file: LocalFile) {
        let ticket = self.on_file_selected(file);
        self.render_thumbnail(ticket).await;
    }

    /// Uploads the selected file with the caption.
    pub async fn upload(&mut self) {
        let Some(file) = self.selected_file.clone() else {
            self.error = NO_FILE_SELECTED.to_owned();
            return;
        };

        match self.api.upload_image(&file, &self.caption).await {
            Ok(UploadResult::Success { image, .. }) => {
                if let Some(image) = image {
                    self.gallery.insert(0, GalleryItem::new(image));
                }
                self.clear_form();
                self.error.clear();
            }
            Ok(UploadResult::Failure(errors)) => {
                log::warn!("upload of {} rejected: {errors:?}", file.name);
                self.error.push_str(&errors.to_message());
            }
            Err(e) => {
                log::error!("upload of {} failed: {e}", file.name);
                self.error = UPLOAD_FAILED.to_owned();
            }
        }
    }

    fn clear_form(&mut self) {
        self.selected_file = None;
        self.file_input.clear();
        self.caption.clear();
        self.thumbnail.clear();
    }

    // -- search --------------------------------------------------------------

    /// Runs the search box query now. An empty query shows everything.
    pub async fn search(&mut self) {
        let result = self.api.search_images(&self.search_query).await;
        self.apply_search_result(result.map_err(DebounceError::Failed));
    }

    /// Schedules the search box query through the debouncer.
    ///
    /// Calls made while one is pending share it, so the query of the first
    /// caller is the one sent. Feed the outcome to
    /// [`Self::apply_search_result`].
    pub fn search_debounced(&self) -> SearchCall {
        self.search.call(self.search_query.clone())
    }

    pub fn apply_search_result(&mut self, result: Result<Vec<ImageRecord>, DebounceError<ApiError>>) {
        match result {
            Ok(images) => {
                self.replace_gallery(images);
                self.error.clear();
            }
            Err(e) => {
                log::error!("search for {:?} failed: {e}", self.search_query);
                self.error = FETCH_IMAGES_FAILED.to_owned();
            }
        }
    }

    // -- gallery item actions ------------------------------------------------

    /// Commits the tag editor of item `index`.
    pub async fn commit_tags(&mut self, index: usize) {
        let Some(item) = self.gallery.get_mut(index) else {
            return;
        };
        match item.commit_tags(self.api.as_ref()).await {
            Ok(Some(UploadResult::Failure(errors))) => self.error.push_str(&errors.to_message()),
            Ok(_) => {}
            Err(e) => {
                log::error!("updating tags failed: {e}");
                self.error = UPDATE_TAGS_FAILED.to_owned();
            }
        }
    }

    pub async fn delete(&mut self, index: usize) {
        let Some(item) = self.gallery.get_mut(index) else {
            return;
        };
        match item.delete(self.api.as_ref()).await {
            Ok(Some(UploadResult::Failure(errors))) => self.error.push_str(&errors.to_message()),
            Ok(_) => {}
            Err(e) => {
                log::error!("deleting image failed: {e}");
                self.error = DELETE_FAILED.to_owned();
            }
        }
    }

    /// Copies item `index` to `clipboard`. Returns `true` if something was
    /// written.
    pub async fn copy<C>(&mut self, index: usize, clipboard: &C) -> bool
    where
        C: ClipboardProvider + Sync + ?Sized,
    {
        let Some(item) = self.gallery.get(index) else {
            return false;
        };
        match item.copy(self.api.as_ref(), clipboard).await {
            Ok(copied) => copied,
            Err(e) => {
                if matches!(e, CopyError::Decode(_) | CopyError::Encode(_)) {
                    log::error!("{e}");
                }
                self.error = COPY_FAILED.to_owned();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HttpImageApi;

    fn controller() -> AppController {
        let config = BusinessConfig::new("http://127.0.0.1:9");
        AppController::new(HttpImageApi::shared(config.clone()), &config)
    }

    #[test]
    fn test_paste_routes_files_and_text() {
        let mut app = controller();
        app.set_caption("keep me");

        let file = LocalFile::new("a.png", "image/png", vec![1, 2, 3]);
        assert!(app.on_paste(PastePayload::with_file(file.clone())).is_some());
        assert_eq!(app.selected_file(), Some(&file));
        assert_eq!(app.file_input(), std::slice::from_ref(&file));
        assert_eq!(app.caption(), "keep me");

        assert!(app.on_paste(PastePayload::with_text("cat dog")).is_none());
        assert_eq!(app.caption(), "cat dog");
        assert_eq!(app.selected_file(), Some(&file));

        assert!(app.on_paste(PastePayload::default()).is_none());
        assert_eq!(app.caption(), "cat dog");
    }

    #[tokio::test]
    async fn test_upload_without_file_sets_error() {
        let mut app = controller();
        app.upload().await;
        assert_eq!(app.error(), NO_FILE_SELECTED);
    }

    #[tokio::test]
    async fn test_mount_is_idempotent_and_unmount_deregisters() {
        let hub = PasteHub::new();
        let mut app = controller();

        // Nothing listens on port 9, so the fetch fails into the error slot.
        app.mount(&hub).await;
        app.mount(&hub).await;
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(app.error(), FETCH_IMAGES_FAILED);

        hub.dispatch(PastePayload::with_text("pasted"));
        assert_eq!(app.pump_events().await, 1);
        assert_eq!(app.caption(), "pasted");

        app.unmount(&hub);
        assert!(!app.is_mounted());
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.dispatch(PastePayload::with_text("late")), 0);
    }
}
