//! HTTP transport seam between the gateway and the Remote API.
//!
//! DESIGN
//! ======
//! The gateway speaks in `ApiRequest`/`ApiResponse` values and never touches
//! `reqwest` directly. `ReqwestTransport` is the production implementation;
//! tests swap in `test_helpers::MockTransport`, which scripts responses and
//! records every request so retry behavior can be asserted exactly.
//!
//! Response bodies are read to text eagerly. Status inspection is left to the
//! caller: a 4xx is a successful transport round-trip.

use std::time::Duration;

use reqwest::header::ACCEPT;

use crate::error::GatewayError;
use crate::forms::ImageUpload;

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(ImageUpload),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<(String, FormValue)>),
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Bearer token attached by the gateway; callers leave this unset.
    pub bearer: Option<String>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: RequestBody::Empty, bearer: None }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_owned());
        self
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Turn a non-success response into [`GatewayError::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns the decoded rejection when the status is not 2xx.
    pub fn error_for_status(self) -> Result<Self, GatewayError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GatewayError::rejected(self.status, &self.body))
        }
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Only failures to obtain a response are errors.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError>;
}

/// `reqwest`-backed transport rooted at the API base URL.
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`GatewayError::HttpClientBuild`] if the client cannot be built.
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn multipart_form(fields: &[(String, FormValue)]) -> Result<reqwest::multipart::Form, GatewayError> {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in fields {
        form = match value {
            FormValue::Text(text) => form.text(name.clone(), text.clone()),
            FormValue::File(upload) => {
                let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.content_type)
                    .map_err(|e| GatewayError::Transport(format!("invalid upload type: {e}")))?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
        let url = self.url(&request.path);
        tracing::debug!(method = ?request.method, %url, "api request");

        let mut builder = self
            .http
            .request(request.method.as_reqwest(), &url)
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(fields) => builder.multipart(multipart_form(fields)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        tracing::debug!(%status, %url, "api response");
        Ok(ApiResponse { status, body })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use std::sync::Mutex;

    type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, GatewayError> + Send + Sync>;

    /// Scripted transport: every request is recorded, then answered by the
    /// handler. An optional per-path delay lets tests interleave calls.
    pub struct MockTransport {
        handler: Handler,
        requests: Mutex<Vec<ApiRequest>>,
        delay: Option<(String, Duration)>,
    }

    impl MockTransport {
        pub fn new(handler: impl Fn(&ApiRequest) -> Result<ApiResponse, GatewayError> + Send + Sync + 'static) -> Self {
            Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()), delay: None }
        }

        pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
            self.delay = Some((path.to_owned(), delay));
            self
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn count(&self, path: &str) -> usize {
            self.requests.lock().unwrap().iter().filter(|r| r.path == path).count()
        }
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some((path, delay)) = &self.delay {
                if request.path == *path {
                    tokio::time::sleep(*delay).await;
                }
            }
            (self.handler)(request)
        }
    }

    pub fn respond(status: u16, body: serde_json::Value) -> Result<ApiResponse, GatewayError> {
        Ok(ApiResponse::new(status, body.to_string()))
    }

    pub fn bearer(request: &ApiRequest) -> Option<&str> {
        request.bearer.as_deref()
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
