//! System clipboard access for pasting and copying images.
//!
//! The [`ClipboardProvider`] trait is the seam between the gallery controllers
//! and the platform clipboard:
//! - [`ClipboardProvider::read_paste`] turns whatever is on the clipboard into a
//!   [`PastePayload`] (file attachments or plain text)
//! - [`ClipboardProvider::set_image`] writes an image object for the copy action
//!
//! [`SystemClipboard`] is the production implementation backed by `arboard`.
//!
//! # File URI Support
//!
//! File managers (Dolphin, Nautilus, Finder) put `file://` URIs on the
//! clipboard instead of image data when a file is copied. Those URIs are
//! resolved and the original file bytes are pasted as attachments, so the
//! upload keeps the source encoding.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::file::{LocalFile, mime_for_extension};

/// Image payload retrieved from the clipboard, preserved as encoded bytes when possible.
#[derive(Debug, Clone)]
pub struct ClipboardImagePayload {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type of the encoded payload (e.g., "image/png", "image/jpeg").
    pub mime_type: String,
    /// Suggested filename for the image.
    pub filename: String,
}

impl From<ClipboardImagePayload> for LocalFile {
    fn from(payload: ClipboardImagePayload) -> Self {
        Self::new(payload.filename, payload.mime_type, payload.bytes)
    }
}

/// Image data written to the clipboard.
#[derive(Debug, Clone)]
pub struct ClipboardImage {
    /// Width of the image in pixels.
    pub width: usize,
    /// Height of the image in pixels.
    pub height: usize,
    /// Encoded image bytes; decoded to RGBA before they reach the clipboard.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: String,
    /// Suggested filename for the image.
    pub filename: String,
}

/// What a paste delivered: file attachments, plain text, or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PastePayload {
    /// Attached files, in clipboard order.
    pub files: Vec<LocalFile>,
    /// Plain text content, if any.
    pub text: Option<String>,
}

impl PastePayload {
    pub fn with_file(file: LocalFile) -> Self {
        Self {
            files: vec![file],
            text: None,
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            text: Some(text.into()),
        }
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Non-empty text, if the payload carries any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        !self.has_files() && self.text().is_none()
    }
}

/// Error types for clipboard operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// Failed to access the clipboard.
    #[error("Clipboard access error: {0}")]
    AccessError(String),
    /// Image encoding/decoding failed.
    #[error("Image processing error: {0}")]
    ImageError(String),
}

/// Trait for clipboard access, enabling mock implementations for testing.
pub trait ClipboardProvider {
    /// Returns the clipboard text, or `None` when there is no text content.
    fn get_text(&self) -> Result<Option<String>, ClipboardError>;

    /// Returns an encoded image payload, or `None` when there is no image.
    fn get_image_payload(&self) -> Result<Option<ClipboardImagePayload>, ClipboardError>;

    /// Replaces the clipboard contents with an image object.
    fn set_image(&self, image: &ClipboardImage) -> Result<(), ClipboardError>;

    /// Reads the clipboard as a paste would see it.
    ///
    /// Images win over text: text is only consulted when there is no image.
    fn read_paste(&self) -> Result<PastePayload, ClipboardError> {
        if let Some(payload) = self.get_image_payload()? {
            return Ok(PastePayload::with_file(payload.into()));
        }

        Ok(PastePayload {
            files: Vec::new(),
            text: self.get_text()?.filter(|t| !t.is_empty()),
        })
    }
}

/// System clipboard implementation using the `arboard` crate.
#[derive(Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn open() -> Result<arboard::Clipboard, ClipboardError> {
        arboard::Clipboard::new().map_err(|e| ClipboardError::AccessError(e.to_string()))
    }
}

fn read_text(clipboard: &mut arboard::Clipboard) -> Result<Option<String>, ClipboardError> {
    match clipboard.get_text() {
        Ok(text) => Ok(Some(text)),
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(e) => Err(ClipboardError::AccessError(e.to_string())),
    }
}

/// Encodes bitmap clipboard content as a PNG payload.
fn read_bitmap(
    clipboard: &mut arboard::Clipboard,
) -> Result<Option<ClipboardImagePayload>, ClipboardError> {
    match clipboard.get_image() {
        Ok(image_data) => {
            let png_data =
                encode_rgba_to_png(image_data.width, image_data.height, &image_data.bytes)?;
            Ok(Some(ClipboardImagePayload {
                bytes: png_data,
                mime_type: "image/png".to_owned(),
                filename: clipboard_filename(),
            }))
        }
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(e) => Err(ClipboardError::AccessError(e.to_string())),
    }
}

impl ClipboardProvider for SystemClipboard {
    fn get_text(&self) -> Result<Option<String>, ClipboardError> {
        read_text(&mut Self::open()?)
    }

    fn get_image_payload(&self) -> Result<Option<ClipboardImagePayload>, ClipboardError> {
        let mut clipboard = Self::open()?;

        // Prefer original file bytes when the clipboard holds `file://` URIs.
        if let Some(text) = read_text(&mut clipboard)?
            && let Some(payload) = payloads_from_file_uris(&text).into_iter().next()
        {
            return Ok(Some(payload));
        }

        read_bitmap(&mut clipboard)
    }

    fn set_image(&self, image: &ClipboardImage) -> Result<(), ClipboardError> {
        let rgba = image::load_from_memory(&image.bytes)
            .map_err(|e| ClipboardError::ImageError(format!("Failed to decode image: {e}")))?
            .to_rgba8()
            .into_raw();

        let mut clipboard = Self::open()?;
        clipboard
            .set_image(arboard::ImageData {
                width: image.width,
                height: image.height,
                bytes: Cow::Owned(rgba),
            })
            .map_err(|e| ClipboardError::AccessError(e.to_string()))
    }

    fn read_paste(&self) -> Result<PastePayload, ClipboardError> {
        let mut clipboard = Self::open()?;
        let text = read_text(&mut clipboard)?;

        // Several files may be selected in a file manager; keep them all.
        let files: Vec<LocalFile> = text
            .as_deref()
            .map(payloads_from_file_uris)
            .unwrap_or_default()
            .into_iter()
            .map(LocalFile::from)
            .collect();
        if !files.is_empty() {
            return Ok(PastePayload { files, text: None });
        }

        if let Some(payload) = read_bitmap(&mut clipboard)? {
            return Ok(PastePayload::with_file(payload.into()));
        }

        Ok(PastePayload {
            files: Vec::new(),
            text: text.filter(|t| !t.is_empty()),
        })
    }
}

fn clipboard_filename() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("clipboard_{timestamp}.png")
}

/// Encodes RGBA pixel data to PNG format.
pub fn encode_rgba_to_png(
    width: usize,
    height: usize,
    rgba_data: &[u8],
) -> Result<Vec<u8>, ClipboardError> {
    use image::{ImageBuffer, Rgba};

    let width = u32::try_from(width)
        .map_err(|_err| ClipboardError::ImageError("Image too wide".to_owned()))?;
    let height = u32::try_from(height)
        .map_err(|_err| ClipboardError::ImageError("Image too tall".to_owned()))?;

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, rgba_data.to_vec())
            .ok_or_else(|| ClipboardError::ImageError("Invalid image dimensions".to_owned()))?;

    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| ClipboardError::ImageError(format!("Failed to encode PNG: {e}")))?;

    Ok(cursor.into_inner())
}

/// Loads every image file referenced by a `file://` URI line in `text`.
fn payloads_from_file_uris(text: &str) -> Vec<ClipboardImagePayload> {
    text.lines()
        .filter_map(|line| extract_file_path_from_uri(line.trim()))
        .filter_map(|path| {
            log::trace!(
                target: "hannou_input::clipboard",
                "file_uri_payload_detected path={path:?}",
            );
            load_payload_from_path(&path)
        })
        .collect()
}

/// Extracts an existing filesystem path from a `file://` URI.
///
/// Percent-encoded characters (spaces, non-ASCII) are decoded.
fn extract_file_path_from_uri(uri: &str) -> Option<PathBuf> {
    let uri = uri.trim();
    if !uri.get(..7)?.eq_ignore_ascii_case("file://") {
        return None;
    }

    let decoded = urlencoding::decode(uri.get(7..)?).ok()?;
    let path = PathBuf::from(decoded.as_ref());

    if path.is_file() {
        Some(path)
    } else {
        log::trace!(
            target: "hannou_input::clipboard",
            "file_uri_not_found path={path:?}",
        );
        None
    }
}

/// Loads an image file's original bytes; non-image extensions are skipped.
fn load_payload_from_path(path: &Path) -> Option<ClipboardImagePayload> {
    let extension = path.extension()?.to_str()?;
    let mime_type = mime_for_extension(extension);
    if !mime_type.starts_with("image/") {
        return None;
    }

    let bytes = std::fs::read(path).ok()?;
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clipboard_image".to_owned());

    Some(ClipboardImagePayload {
        bytes,
        mime_type: mime_type.to_owned(),
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockClipboard {
        image: Option<ClipboardImagePayload>,
        text: Option<String>,
    }

    impl ClipboardProvider for MockClipboard {
        fn get_text(&self) -> Result<Option<String>, ClipboardError> {
            Ok(self.text.clone())
        }

        fn get_image_payload(&self) -> Result<Option<ClipboardImagePayload>, ClipboardError> {
            Ok(self.image.clone())
        }

        fn set_image(&self, _image: &ClipboardImage) -> Result<(), ClipboardError> {
            Ok(())
        }
    }

    struct MockClipboardError;

    impl ClipboardProvider for MockClipboardError {
        fn get_text(&self) -> Result<Option<String>, ClipboardError> {
            Err(ClipboardError::AccessError("Mock error".to_owned()))
        }

        fn get_image_payload(&self) -> Result<Option<ClipboardImagePayload>, ClipboardError> {
            Err(ClipboardError::AccessError("Mock error".to_owned()))
        }

        fn set_image(&self, _image: &ClipboardImage) -> Result<(), ClipboardError> {
            Err(ClipboardError::AccessError("Mock error".to_owned()))
        }
    }

    fn png_payload() -> ClipboardImagePayload {
        ClipboardImagePayload {
            bytes: vec![137, 80, 78, 71],
            mime_type: "image/png".to_owned(),
            filename: "shot.png".to_owned(),
        }
    }

    #[test]
    fn test_read_paste_prefers_image_over_text() {
        let mock = MockClipboard {
            image: Some(png_payload()),
            text: Some("caption".to_owned()),
        };

        let paste = mock.read_paste().expect("should succeed");
        assert_eq!(paste.files.len(), 1);
        assert_eq!(paste.files[0].name, "shot.png");
        assert!(paste.text.is_none());
    }

    #[test]
    fn test_read_paste_text_only() {
        let mock = MockClipboard {
            image: None,
            text: Some("cat funny".to_owned()),
        };

        let paste = mock.read_paste().expect("should succeed");
        assert!(!paste.has_files());
        assert_eq!(paste.text(), Some("cat funny"));
    }

    #[test]
    fn test_read_paste_empty_text_is_empty_payload() {
        let mock = MockClipboard {
            image: None,
            text: Some(String::new()),
        };

        let paste = mock.read_paste().expect("should succeed");
        assert!(paste.is_empty());
    }

    #[test]
    fn test_read_paste_propagates_errors() {
        assert!(MockClipboardError.read_paste().is_err());
    }

    #[test]
    fn test_encode_rgba_to_png_roundtrips_dimensions() {
        let png = encode_rgba_to_png(3, 2, &[255u8; 3 * 2 * 4]).expect("encode");
        let decoded = image::load_from_memory(&png).expect("decode");
        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);
    }

    #[test]
    fn test_encode_rgba_to_png_rejects_short_buffer() {
        let err = encode_rgba_to_png(10, 10, &[0u8; 4]).expect_err("should fail");
        assert!(matches!(err, ClipboardError::ImageError(_)));
    }

    #[test]
    fn test_extract_file_path_from_uri_decodes_and_checks_existence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("my cat.png");
        std::fs::write(&path, b"png").expect("write");

        let uri = format!("FILE://{}", path.display()).replace(' ', "%20");
        assert_eq!(extract_file_path_from_uri(&uri), Some(path));
        assert_eq!(extract_file_path_from_uri("https://example.com/a.png"), None);
        assert_eq!(extract_file_path_from_uri("file:///definitely/missing.png"), None);
    }

    #[test]
    fn test_payloads_from_file_uris_skips_non_images() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = dir.path().join("a.jpg");
        let notes = dir.path().join("notes.txt");
        std::fs::write(&image, b"jpeg bytes").expect("write");
        std::fs::write(&notes, b"text").expect("write");

        let text = format!("file://{}\nfile://{}\n", notes.display(), image.display());
        let payloads = payloads_from_file_uris(&text);

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].filename, "a.jpg");
        assert_eq!(payloads[0].mime_type, "image/jpeg");
        assert_eq!(payloads[0].bytes, b"jpeg bytes");
    }

    #[test]
    fn test_paste_payload_text_filters_empty() {
        let payload = PastePayload {
            files: Vec::new(),
            text: Some(String::new()),
        };
        assert!(payload.text().is_none());
        assert!(payload.is_empty());
        assert!(!PastePayload::with_text("x").is_empty());
    }
}
