//! Input sources for hannou: the system clipboard and local files.
//!
//! # Modules
//!
//! - [`clipboard`]: System clipboard access for pasting and copying images
//! - [`file`]: Local file handles selected for upload
//!
//! Clipboard access goes through the [`ClipboardProvider`] trait so the
//! controllers in `hannou-business` can be tested without a real clipboard.

pub mod clipboard;
pub mod file;

pub use clipboard::{
    ClipboardError, ClipboardImage, ClipboardImagePayload, ClipboardProvider, PastePayload,
    SystemClipboard,
};
pub use file::{LocalFile, mime_for_extension};
