//! REST client for the image board API.
//!
//! [`ImageApi`] is the seam the controllers depend on; [`HttpImageApi`] talks
//! to the real server. Status handling follows one rule set:
//!
//! | status | list endpoints        | mutating endpoints                    |
//! |--------|-----------------------|---------------------------------------|
//! | 2xx    | `object_list` decoded | body decoded into [`UploadResult`]    |
//! | 4xx    | [`ApiError::Server`]  | body decoded, usually a field failure |
//! | other  | [`ApiError::Server`]  | [`ApiError::Server`]                  |
//!
//! Network failures are [`ApiError::Transport`]. Nothing is cached or retried.

use std::sync::Arc;

use async_trait::async_trait;

use hannou_input::LocalFile;

use crate::config::BusinessConfig;
use crate::http::{Client, FormPart, RequestBuilder, Response};
use crate::models::{ImageRecord, ObjectList, RawUploadResult, TagRecord, UploadResult};

const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(String),
    /// A status outside the documented success and structured-error paths.
    #[error("server responded with status {status}")]
    Server { status: u16 },
    /// A documented status with a body of the wrong shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the gallery needs from the server.
#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn list_images(&self) -> ApiResult<Vec<ImageRecord>>;

    /// Tag search. The query is sent verbatim; an empty query lists everything.
    async fn search_images(&self, query: &str) -> ApiResult<Vec<ImageRecord>>;

    async fn upload_image(&self, file: &LocalFile, caption: &str) -> ApiResult<UploadResult>;

    async fn update_tags(&self, image_id: &str, tags_text: &str) -> ApiResult<UploadResult>;

    async fn delete_image(&self, image_id: &str) -> ApiResult<UploadResult>;

    async fn list_tags(&self) -> ApiResult<Vec<TagRecord>>;

    /// Images without any tag.
    async fn list_tagless_images(&self) -> ApiResult<Vec<ImageRecord>>;

    /// Tags not attached to any image.
    async fn list_imageless_tags(&self) -> ApiResult<Vec<TagRecord>>;

    /// Downloads an image asset by the URL stored in its record.
    async fn fetch_image(&self, url: &str) -> ApiResult<Vec<u8>>;
}

pub type SharedApi = Arc<dyn ImageApi>;

/// [`ImageApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpImageApi {
    config: BusinessConfig,
}

impl HttpImageApi {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }

    pub fn shared(config: BusinessConfig) -> SharedApi {
        Arc::new(Self::new(config))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.api_url())
    }

    fn image_endpoint(&self, image_id: &str) -> String {
        self.endpoint(&format!("images/{image_id}"))
    }

    /// Adds the CSRF header to a mutating request when configured.
    fn guarded(&self, request: RequestBuilder) -> RequestBuilder {
        request.header_opt(CSRF_HEADER, self.config.csrf_token())
    }

    async fn send(request: RequestBuilder) -> ApiResult<Response> {
        let method = request.method();
        let url = request.url().to_owned();
        let response = request.send().await.map_err(|e| {
            log::warn!(target: "hannou_business::api", "{method:?} {url} failed: {e}");
            ApiError::Transport(e.message)
        })?;
        log::debug!(
            target: "hannou_business::api",
            "{method:?} {url} -> {}",
            response.status
        );
        Ok(response)
    }

    async fn fetch_list<T: serde::de::DeserializeOwned>(
        request: RequestBuilder,
    ) -> ApiResult<Vec<T>> {
        let response = Self::send(request).await?;
        if !response.is_success() {
            return Err(ApiError::Server {
                status: response.status,
            });
        }
        let list: ObjectList<T> = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(list.object_list)
    }

    async fn mutate(request: RequestBuilder) -> ApiResult<UploadResult> {
        let response = Self::send(request).await?;
        interpret_mutation(&response)
    }
}

/// Maps a mutating endpoint's response onto [`UploadResult`].
fn interpret_mutation(response: &Response) -> ApiResult<UploadResult> {
    if response.is_success() {
        let raw: RawUploadResult = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        return Ok(raw.into());
    }

    if response.is_client_error() {
        // A 4xx without the structured body counts as a plain server failure.
        return match response.json::<RawUploadResult>() {
            Ok(raw) => Ok(raw.into()),
            Err(e) => {
                log::debug!(
                    target: "hannou_business::api",
                    "unstructured {} body: {e}",
                    response.status
                );
                Err(ApiError::Server {
                    status: response.status,
                })
            }
        };
    }

    Err(ApiError::Server {
        status: response.status,
    })
}

#[async_trait]
impl ImageApi for HttpImageApi {
    async fn list_images(&self) -> ApiResult<Vec<ImageRecord>> {
        Self::fetch_list(Client::get(self.endpoint("images"))).await
    }

    async fn search_images(&self, query: &str) -> ApiResult<Vec<ImageRecord>> {
        if query.is_empty() {
            return self.list_images().await;
        }
        let request = self.guarded(Client::post(self.endpoint("images")).text(query));
        Self::fetch_list(request).await
    }

    async fn upload_image(&self, file: &LocalFile, caption: &str) -> ApiResult<UploadResult> {
        let parts = vec![
            FormPart::File {
                name: "image".to_owned(),
                filename: file.name.clone(),
                mime_type: file.mime_type.clone(),
                bytes: file.bytes.to_vec(),
            },
            FormPart::Text {
                name: "text".to_owned(),
                value: caption.to_owned(),
            },
        ];
        let request = self.guarded(Client::post(self.endpoint("upload")).multipart(parts));
        let result = Self::mutate(request).await?;

        if let UploadResult::Success { image: None, .. } = result {
            return Err(ApiError::Decode("upload succeeded without an image".to_owned()));
        }
        Ok(result)
    }

    async fn update_tags(&self, image_id: &str, tags_text: &str) -> ApiResult<UploadResult> {
        let request = self.guarded(Client::post(self.image_endpoint(image_id)).text(tags_text));
        Self::mutate(request).await
    }

    async fn delete_image(&self, image_id: &str) -> ApiResult<UploadResult> {
        let request = self.guarded(Client::delete(self.image_endpoint(image_id)));
        Self::mutate(request).await
    }

    async fn list_tags(&self) -> ApiResult<Vec<TagRecord>> {
        Self::fetch_list(Client::get(self.endpoint("tags"))).await
    }

    async fn list_tagless_images(&self) -> ApiResult<Vec<ImageRecord>> {
        Self::fetch_list(Client::get(self.endpoint("images/tagless"))).await
    }

    async fn list_imageless_tags(&self) -> ApiResult<Vec<TagRecord>> {
        Self::fetch_list(Client::get(self.endpoint("tags/imageless"))).await
    }

    async fn fetch_image(&self, url: &str) -> ApiResult<Vec<u8>> {
        let response = Self::send(Client::get(self.config.resolve_url(url))).await?;
        if !response.is_success() {
            return Err(ApiError::Server {
                status: response.status,
            });
        }
        Ok(response.body)
    }
}
