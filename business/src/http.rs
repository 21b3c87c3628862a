//! Thin HTTP transport over `reqwest`.
//!
//! Requests are described by a [`RequestBuilder`] that only holds owned,
//! `Send` data, and the reply is collected into a [`Response`] with the body
//! fully buffered. Status interpretation is left to the caller (see
//! [`crate::api`]), so a 4xx with a JSON body is a normal `Ok(Response)` here.

use std::collections::HashMap;

/// HTTP method for requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response body as bytes
    pub body: Vec<u8>,
}

impl Response {
    /// Returns true if the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 4xx statuses, which carry a structured error body.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Attempt to deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP client error: the request never produced a response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP error: {message}")]
pub struct HttpError {
    pub message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone)]
enum Body {
    Bytes(Vec<u8>),
    Multipart(Vec<FormPart>),
}

/// A builder for constructing HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    headers: HashMap<String, String>,
    body: Option<Body>,
}

impl RequestBuilder {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a header only when `value` is present.
    pub fn header_opt(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.header(name, v),
            None => self,
        }
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::Bytes(body.into()));
        self
    }

    /// Set the request body as a plain text string.
    pub fn text(self, body: impl Into<String>) -> Self {
        self.header("content-type", "text/plain; charset=utf-8")
            .body(body.into().into_bytes())
    }

    /// Set the request body as `multipart/form-data`.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(Body::Multipart(parts));
        self
    }

    /// Send the request and buffer the whole response.
    pub async fn send(self) -> HttpResult<Response> {
        let client = reqwest::Client::new();

        let mut request = match self.method {
            Method::Get => client.get(&self.url),
            Method::Post => client.post(&self.url),
            Method::Delete => client.delete(&self.url),
        };

        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        match self.body {
            Some(Body::Bytes(bytes)) => request = request.body(bytes),
            Some(Body::Multipart(parts)) => request = request.multipart(build_form(parts)?),
            None => {}
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?;

        let status = response.status().as_u16();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?
            .to_vec();

        Ok(Response { status, body })
    }
}

fn build_form(parts: Vec<FormPart>) -> HttpResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                filename,
                mime_type,
                bytes,
            } => {
                let file_part = reqwest::multipart::Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str(&mime_type)
                    .map_err(|e| HttpError::new(format!("invalid MIME type {mime_type}: {e}")))?;
                form.part(name, file_part)
            }
        };
    }
    Ok(form)
}

/// Entry point for building requests.
///
/// ```ignore
/// use hannou_business::http::Client;
///
/// let response = Client::get("http://localhost:8000/api/images").send().await?;
/// if response.is_success() {
///     let list: ObjectList<ImageRecord> = response.json()?;
/// }
/// ```
pub struct Client;

impl Client {
    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Post, url)
    }

    /// Create a DELETE request.
    pub fn delete(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Delete, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &[u8]) -> Response {
        Response {
            status,
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_response_status_classes() {
        assert!(response(200, b"").is_success());
        assert!(response(201, b"").is_success());
        assert!(!response(404, b"").is_success());
        assert!(response(400, b"").is_client_error());
        assert!(!response(500, b"").is_client_error());
    }

    #[test]
    fn test_response_json() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct TestData {
            success: bool,
        }

        let data: TestData = response(200, br#"{"success": true}"#)
            .json()
            .expect("valid json");
        assert_eq!(data, TestData { success: true });
    }

    #[test]
    fn test_request_builder_header_opt() {
        let builder = Client::post("http://example.com")
            .header_opt("X-CSRFToken", Some("abc"))
            .header_opt("X-Missing", None);

        assert_eq!(builder.headers.get("X-CSRFToken"), Some(&"abc".to_owned()));
        assert!(!builder.headers.contains_key("X-Missing"));
        assert_eq!(builder.method(), Method::Post);
        assert_eq!(builder.url(), "http://example.com");
    }

    #[test]
    fn test_request_builder_text_sets_content_type() {
        let builder = Client::post("http://example.com").text("cat dog");
        assert_eq!(
            builder.headers.get("content-type"),
            Some(&"text/plain; charset=utf-8".to_owned())
        );
        assert!(matches!(builder.body, Some(Body::Bytes(ref b)) if b == b"cat dog"));
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let parts = vec![FormPart::File {
            name: "image".to_owned(),
            filename: "a.png".to_owned(),
            mime_type: "not a mime".to_owned(),
            bytes: vec![1],
        }];
        assert!(build_form(parts).is_err());
    }
}
