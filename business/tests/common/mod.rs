use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hannou_business::{
    ApiError, ApiResult, AppController, BusinessConfig, FieldErrors, ImageApi, ImageRecord,
    SharedApi, TagRecord, UploadResult,
};
use hannou_input::{
    ClipboardError, ClipboardImage, ClipboardImagePayload, ClipboardProvider, LocalFile,
};
use wiremock::MockServer;

#[allow(unused)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(unused)]
pub fn timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[allow(unused)]
pub fn record(url: &str, tags: &[&str]) -> ImageRecord {
    ImageRecord {
        image_url: url.to_owned(),
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        updated_at: timestamp(),
    }
}

#[allow(unused)]
pub fn record_json(url: &str, tags: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "image_url": url,
        "tags": tags,
        "updated_at": "2024-05-01T10:00:00Z",
    })
}

#[allow(unused)]
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 128, 255, 255]));
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png)
        .expect("encode png");
    cursor.into_inner()
}

#[allow(unused)]
pub fn png_file(name: &str) -> LocalFile {
    LocalFile::new(name, "image/png", png_bytes(4, 4))
}

/// Controller wired to a wiremock server.
#[allow(unused)]
pub async fn http_controller() -> (MockServer, AppController) {
    init_logger();
    let server = MockServer::start().await;
    let config = BusinessConfig::new(server.uri()).with_csrf_token("test-csrf");
    let api = hannou_business::HttpImageApi::shared(config.clone());
    let controller = AppController::new(api, &config);
    (server, controller)
}

/// Which [`ImageApi`] method was called, with its arguments.
#[allow(unused)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Search(String),
    Upload { name: String, caption: String },
    UpdateTags { id: String, text: String },
    Delete(String),
    ListTags,
    ListTagless,
    ListImageless,
    FetchImage(String),
}

/// In-memory [`ImageApi`] that records calls and answers from queues.
#[allow(unused)]
#[derive(Default)]
pub struct MockImageApi {
    calls: Mutex<Vec<Call>>,
    pub images: Mutex<Vec<ImageRecord>>,
    pub tags: Mutex<Vec<TagRecord>>,
    pub mutations: Mutex<VecDeque<ApiResult<UploadResult>>>,
    pub image_bytes: Mutex<Vec<u8>>,
    pub fail_lists: Mutex<bool>,
    list_count: AtomicUsize,
}

#[allow(unused)]
impl MockImageApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_images(images: Vec<ImageRecord>) -> Arc<Self> {
        let api = Self::default();
        *api.images.lock().expect("lock") = images;
        Arc::new(api)
    }

    pub fn push_mutation(&self, result: ApiResult<UploadResult>) {
        self.mutations.lock().expect("lock").push_back(result);
    }

    pub fn fail_lists(&self) {
        *self.fail_lists.lock().expect("lock") = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }

    pub fn list_count(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    pub fn controller(self: &Arc<Self>) -> AppController {
        let api: SharedApi = Arc::clone(self) as SharedApi;
        let config = BusinessConfig {
            thumbnail_width: 8,
            thumbnail_height: 8,
            ..BusinessConfig::default()
        };
        AppController::new(api, &config)
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }

    fn list(&self) -> ApiResult<Vec<ImageRecord>> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        if *self.fail_lists.lock().expect("lock") {
            return Err(ApiError::Server { status: 500 });
        }
        Ok(self.images.lock().expect("lock").clone())
    }

    fn next_mutation(&self) -> ApiResult<UploadResult> {
        self.mutations
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(Ok(UploadResult::Success {
                updated: true,
                image: None,
            }))
    }
}

#[async_trait]
impl ImageApi for MockImageApi {
    async fn list_images(&self) -> ApiResult<Vec<ImageRecord>> {
        self.record_call(Call::List);
        self.list()
    }

    async fn search_images(&self, query: &str) -> ApiResult<Vec<ImageRecord>> {
        self.record_call(Call::Search(query.to_owned()));
        let images = self.list()?;
        if query.is_empty() {
            return Ok(images);
        }
        Ok(images
            .into_iter()
            .filter(|image| image.tags.iter().any(|t| t == query))
            .collect())
    }

    async fn upload_image(&self, file: &LocalFile, caption: &str) -> ApiResult<UploadResult> {
        self.record_call(Call::Upload {
            name: file.name.clone(),
            caption: caption.to_owned(),
        });
        self.next_mutation()
    }

    async fn update_tags(&self, image_id: &str, tags_text: &str) -> ApiResult<UploadResult> {
        self.record_call(Call::UpdateTags {
            id: image_id.to_owned(),
            text: tags_text.to_owned(),
        });
        self.next_mutation()
    }

    async fn delete_image(&self, image_id: &str) -> ApiResult<UploadResult> {
        self.record_call(Call::Delete(image_id.to_owned()));
        self.next_mutation()
    }

    async fn list_tags(&self) -> ApiResult<Vec<TagRecord>> {
        self.record_call(Call::ListTags);
        if *self.fail_lists.lock().expect("lock") {
            return Err(ApiError::Transport("offline".to_owned()));
        }
        Ok(self.tags.lock().expect("lock").clone())
    }

    async fn list_tagless_images(&self) -> ApiResult<Vec<ImageRecord>> {
        self.record_call(Call::ListTagless);
        Ok(self
            .list()?
            .into_iter()
            .filter(|image| image.tags.is_empty())
            .collect())
    }

    async fn list_imageless_tags(&self) -> ApiResult<Vec<TagRecord>> {
        self.record_call(Call::ListImageless);
        Ok(Vec::new())
    }

    async fn fetch_image(&self, url: &str) -> ApiResult<Vec<u8>> {
        self.record_call(Call::FetchImage(url.to_owned()));
        Ok(self.image_bytes.lock().expect("lock").clone())
    }
}

#[allow(unused)]
pub fn field_errors(pairs: &[(&str, &str)]) -> FieldErrors {
    pairs.iter().copied().collect()
}

/// Clipboard that keeps whatever was written to it.
#[allow(unused)]
#[derive(Default)]
pub struct MemoryClipboard {
    pub written: Mutex<Vec<ClipboardImage>>,
}

impl ClipboardProvider for MemoryClipboard {
    fn get_text(&self) -> Result<Option<String>, ClipboardError> {
        Ok(None)
    }

    fn get_image_payload(&self) -> Result<Option<ClipboardImagePayload>, ClipboardError> {
        Ok(None)
    }

    fn set_image(&self, image: &ClipboardImage) -> Result<(), ClipboardError> {
        self.written.lock().expect("lock").push(image.clone());
        Ok(())
    }
}
