//! Client-side logic for the hannou image board.
//!
//! # Modules
//!
//! - [`models`]: Image, tag and upload result types
//! - [`http`]: Buffered HTTP transport over `reqwest`
//! - [`api`]: The [`ImageApi`] seam and its HTTP implementation
//! - [`debounce`]: Trailing debounce and shared-call async debounce
//! - [`thumbnail`]: Upload preview rendering
//! - [`paste`]: Paste listener hub and paste classification
//! - [`gallery_item`]: Per-image tag edit, delete and copy
//! - [`app`]: The root controller composing all of the above
//! - [`config`]: Server address and UI tunables

pub mod api;
pub mod app;
pub mod config;
pub mod debounce;
pub mod gallery_item;
pub mod http;
pub mod models;
pub mod paste;
pub mod thumbnail;

pub use api::{ApiError, ApiResult, HttpImageApi, ImageApi, SharedApi};
pub use app::AppController;
pub use config::{BusinessConfig, CSRF_COOKIE_NAME, ConfigError, csrf_from_cookie};
pub use debounce::{AsyncDebounced, DebounceError, Debounced, debounce, debounce_async};
pub use gallery_item::{CopyError, EditKey, GalleryItem, ItemState};
pub use models::{
    DELETED_SENTINEL, FieldErrors, ImageRecord, TagRecord, UploadResult, split_tags,
};
pub use paste::{PasteAction, PasteHub, PasteSubscription, classify};
pub use thumbnail::{PreviewCanvas, ThumbnailError, ThumbnailRenderer};
