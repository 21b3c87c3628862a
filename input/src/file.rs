//! Local file handles.
//!
//! A [`LocalFile`] is what the upload form holds between selection and submit:
//! the name and MIME type the server will see plus the raw, still-encoded bytes.

use std::path::Path;
use std::sync::Arc;

/// A file picked from disk or pasted from the clipboard.
///
/// Bytes are shared so the same handle can sit in the selected-file slot and
/// the mirrored file-input list without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// File name sent as the multipart filename.
    pub name: String,
    /// MIME type of the encoded bytes.
    pub mime_type: String,
    /// Encoded file contents.
    pub bytes: Arc<[u8]>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::from(bytes),
        }
    }

    /// Reads a file from disk, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_owned());
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(mime_for_extension)
            .unwrap_or("application/octet-stream");

        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Maps a file extension (without the dot, any case) to a MIME type.
pub fn mime_for_extension(extension: &str) -> &'static str {
    mime_guess::from_ext(&extension.to_lowercase())
        .first_raw()
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_mime_for_extension_is_case_insensitive() {
        assert_eq!(mime_for_extension("PNG"), "image/png");
        assert_eq!(mime_for_extension("jpeg"), "image/jpeg");
        assert_eq!(mime_for_extension("Jpg"), "image/jpeg");
        assert_eq!(mime_for_extension("qqqzz"), "application/octet-stream");
    }

    #[test]
    fn test_from_path_reads_bytes_and_guesses_mime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cat.webp");
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(b"RIFF....WEBP").expect("write");

        let file = LocalFile::from_path(&path).expect("read");
        assert_eq!(file.name, "cat.webp");
        assert_eq!(file.mime_type, "image/webp");
        assert_eq!(file.len(), 12);
    }

    #[test]
    fn test_from_path_missing_file_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(LocalFile::from_path(&dir.path().join("nope.png")).is_err());
    }

    #[test]
    fn test_clone_shares_bytes() {
        let file = LocalFile::new("a.png", "image/png", vec![1, 2, 3]);
        let copy = file.clone();
        assert!(Arc::ptr_eq(&file.bytes, &copy.bytes));
        assert_eq!(file, copy);
    }
}
