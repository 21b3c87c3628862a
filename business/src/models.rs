//! Wire and in-memory types shared by the API client and the controllers.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Tag list a deleted record is left with. Not a real tag.
pub const DELETED_SENTINEL: &str = "deleted";

static TAG_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    #[expect(clippy::unwrap_used, reason = "pattern is a compile-time constant")]
    Regex::new(r"[,;\s]+").unwrap()
});

/// Splits free tag text the way the server does: on commas, semicolons and
/// whitespace, dropping empty pieces.
pub fn split_tags(text: &str) -> Vec<String> {
    TAG_SEPARATORS
        .split(text)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// One stored image as the gallery sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(alias = "image_file")]
    pub image_url: String,
    /// The tagless listing sends `null` here.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ImageRecord {
    /// Identity used in `/api/images/{id}`: the last path segment of the URL.
    pub fn image_id(&self) -> &str {
        self.image_url.rsplit('/').next().unwrap_or_default()
    }

    /// A deleted record has an empty URL.
    pub fn is_deleted(&self) -> bool {
        self.image_url.is_empty()
    }

    /// Marks the record deleted in place: URL cleared, tags set to the sentinel.
    pub fn mark_deleted(&mut self) {
        self.image_url.clear();
        self.tags = vec![DELETED_SENTINEL.to_owned()];
    }

    /// Tags joined the way the editable tag surface shows them.
    pub fn tag_text(&self) -> String {
        self.tags.join(" ")
    }
}

/// Tag reference data for autocomplete and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `{ "object_list": [...] }` envelope used by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectList<T> {
    pub object_list: Vec<T>,
}

/// Field name to message mapping from a structured error response.
///
/// Fields keep the order the server sent them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, String)>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message of `field`, keeping its position if already present.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = message,
            None => self.0.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// One `field: message` line per field, each terminated by `\n`.
    pub fn to_message(&self) -> String {
        self.iter()
            .map(|(field, message)| format!("{field}: {message}\n"))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.insert(field, message);
        }
        errors
    }
}

/// Django form errors are lists of messages; hand-built ones are strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldMessage {
    One(String),
    Many(Vec<String>),
}

impl From<FieldMessage> for String {
    fn from(message: FieldMessage) -> Self {
        match message {
            FieldMessage::One(s) => s,
            FieldMessage::Many(v) => v.join(","),
        }
    }
}

struct FieldErrorsVisitor;

impl<'de> Visitor<'de> for FieldErrorsVisitor {
    type Value = FieldErrors;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of field names to error messages")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut errors = FieldErrors::new();
        while let Some((field, message)) = access.next_entry::<String, FieldMessage>()? {
            errors.insert(field, message);
        }
        Ok(errors)
    }
}

impl<'de> Deserialize<'de> for FieldErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldErrorsVisitor)
    }
}

/// Outcome of a mutating call (upload, tag update, delete).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    /// The server accepted the change. Upload responses carry the new record.
    Success {
        updated: bool,
        image: Option<ImageRecord>,
    },
    /// The server rejected the change with per-field messages.
    Failure(FieldErrors),
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Body shape shared by `/api/upload` and `/api/images/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawUploadResult {
    pub success: bool,
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub image: Option<ImageRecord>,
    #[serde(default)]
    pub errors: Option<FieldErrors>,
}

impl From<RawUploadResult> for UploadResult {
    fn from(raw: RawUploadResult) -> Self {
        if raw.success {
            Self::Success {
                updated: raw.updated,
                image: raw.image,
            }
        } else {
            Self::Failure(raw.errors.unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, tags: &[&str]) -> ImageRecord {
        ImageRecord {
            image_url: url.to_owned(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            updated_at: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .expect("valid timestamp")
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_split_tags_matches_server_rule() {
        assert_eq!(split_tags("cat, dog;;bird  fish"), vec!["cat", "dog", "bird", "fish"]);
        assert_eq!(split_tags("  "), Vec::<String>::new());
        assert_eq!(split_tags("\ncat\t"), vec!["cat"]);
    }

    #[test]
    fn test_image_id_is_last_segment() {
        assert_eq!(record("/media/abc123.png", &[]).image_id(), "abc123.png");
        assert_eq!(record("abc.png", &[]).image_id(), "abc.png");
        assert_eq!(record("", &[]).image_id(), "");
    }

    #[test]
    fn test_mark_deleted() {
        let mut image = record("/media/a.png", &["cat", "dog"]);
        assert!(!image.is_deleted());
        image.mark_deleted();
        assert!(image.is_deleted());
        assert_eq!(image.tags, vec![DELETED_SENTINEL]);
    }

    #[test]
    fn test_image_record_deserialize_variants() {
        let json = r#"{"image_url": "/media/a.png", "tags": ["cat"], "updated_at": "2024-05-01T10:00:00.123+00:00"}"#;
        let image: ImageRecord = serde_json::from_str(json).expect("valid record");
        assert_eq!(image.tags, vec!["cat"]);

        let json = r#"{"image_file": "b.png", "tags": null, "updated_at": "2024-05-01T10:00:00Z"}"#;
        let image: ImageRecord = serde_json::from_str(json).expect("tagless record");
        assert_eq!(image.image_url, "b.png");
        assert!(image.tags.is_empty());
    }

    #[test]
    fn test_field_errors_message_one_line_per_field() {
        let errors: FieldErrors = [("text", "bad"), ("image", "too large")].into_iter().collect();
        assert_eq!(errors.to_message(), "text: bad\nimage: too large\n");
    }

    #[test]
    fn test_field_errors_keep_server_order() {
        let errors: FieldErrors =
            serde_json::from_str(r#"{"text": ["bad"], "image": "too large"}"#).expect("valid errors");
        assert_eq!(errors.to_message(), "text: bad\nimage: too large\n");

        let mut errors = errors;
        errors.insert("text", "worse");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_message(), "text: worse\nimage: too large\n");
    }

    #[test]
    fn test_field_errors_accepts_django_lists() {
        let errors: FieldErrors =
            serde_json::from_str(r#"{"image": ["This field is required.", "Bad."], "text": "x"}"#)
                .expect("valid errors");
        assert_eq!(errors.get("image"), Some("This field is required.,Bad."));
        assert_eq!(errors.get("text"), Some("x"));
    }

    #[test]
    fn test_raw_upload_result_conversion() {
        let raw: RawUploadResult = serde_json::from_str(
            r#"{"success": true, "updated": false, "image": {"image_url": "/media/a.png", "tags": [], "updated_at": "2024-05-01T10:00:00Z"}}"#,
        )
        .expect("valid body");
        match UploadResult::from(raw) {
            UploadResult::Success { updated, image } => {
                assert!(!updated);
                assert_eq!(image.map(|i| i.image_url), Some("/media/a.png".to_owned()));
            }
            UploadResult::Failure(_) => panic!("expected success"),
        }

        let raw: RawUploadResult =
            serde_json::from_str(r#"{"success": false, "errors": {"image": "too large"}}"#)
                .expect("valid body");
        let result = UploadResult::from(raw);
        assert!(!result.is_success());
        assert_eq!(
            result,
            UploadResult::Failure([("image", "too large")].into_iter().collect())
        );
    }

    #[test]
    fn test_tag_record_deserialize() {
        let tag: TagRecord = serde_json::from_str(
            r#"{"id": 3, "name": "cat", "created_at": "2024-05-01T10:00:00Z", "updated_at": "2024-05-02T10:00:00Z"}"#,
        )
        .expect("valid tag");
        assert_eq!(tag.id, 3);
        assert_eq!(tag.name, "cat");
    }
}
