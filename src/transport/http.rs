use crate::client::policy::{Decision, PolicyEngine};
use crate::config::{ClientConfig, DEFAULT_TIMEOUT};
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Body of an outbound request.
///
/// Multipart forms are consumed when sent, so the parts are kept here and a
/// fresh form is built for every attempt.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub name: String,
    pub file_name: String,
    pub mime: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.files.push(FilePart {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            data: data.into(),
        });
        self
    }

    fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let part = Part::bytes(file.data.to_vec())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)
                .map_err(|e| Error::configuration(format!("Invalid mime '{}': {}", file.mime, e)))?;
            form = form.part(file.name.clone(), part);
        }
        Ok(form)
    }
}

/// Everything needed to (re-)issue one logical request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Deadline for each individual attempt.
    pub timeout: Duration,
    /// Attempts allowed after the first one.
    pub retries: u32,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        let mut d = Self::new(Method::POST, url);
        d.body = RequestBody::Json(body);
        d
    }

    /// POST any serializable body as JSON.
    pub fn post<T: serde::Serialize>(url: impl Into<String>, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::configuration(format!("failed to encode request: {}", e)))?;
        Ok(Self::post_json(url, value))
    }

    pub fn post_multipart(url: impl Into<String>, body: MultipartBody) -> Self {
        let mut d = Self::new(Method::POST, url);
        d.body = RequestBody::Multipart(body);
        d
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Per-invocation statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeStats {
    /// Number of attempts made, including the successful one.
    pub attempts: u32,
    pub duration_ms: u128,
    /// Request id of the successful attempt.
    pub request_id: String,
}

/// A successful response before decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub stats: InvokeStats,
}

/// Executes requests under a deadline with bounded, sequential retry.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: Option<String>,
    policy: PolicyEngine,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // Deadlines are enforced per attempt by `invoke_raw`, not by reqwest.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            policy: PolicyEngine::new(config.retry_delay, config.retry_client_errors),
        })
    }

    pub(crate) fn apply_config(&mut self, config: &ClientConfig) {
        self.api_key = config.api_key.clone();
        self.policy = PolicyEngine::new(config.retry_delay, config.retry_client_errors);
    }

    /// Invoke and decode a JSON response.
    ///
    /// Decoding happens once, after the retry loop: a body that does not match
    /// `T` fails immediately.
    pub async fn invoke<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T> {
        let raw = self.invoke_raw(descriptor).await?;
        serde_json::from_slice(&raw.body).map_err(|e| {
            Error::decode_with_context(
                format!("unexpected response body: {}", e),
                ErrorContext::new()
                    .with_endpoint(descriptor.url.clone())
                    .with_attempts(raw.stats.attempts)
                    .with_request_id(raw.stats.request_id.clone())
                    .with_source("http_transport"),
            )
        })
    }

    /// Invoke and return the raw success body.
    pub async fn invoke_raw(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        let start = Instant::now();
        let mut retries_left = descriptor.retries;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let request_id = Uuid::new_v4().to_string();

            match self.attempt(descriptor, &request_id).await {
                Ok((body, content_type)) => {
                    debug!(
                        endpoint = descriptor.url.as_str(),
                        attempts,
                        duration_ms = start.elapsed().as_millis(),
                        "request succeeded"
                    );
                    return Ok(RawResponse {
                        body,
                        content_type,
                        stats: InvokeStats {
                            attempts,
                            duration_ms: start.elapsed().as_millis(),
                            request_id,
                        },
                    });
                }
                Err(err) => match self.policy.decide(&err, retries_left) {
                    Decision::Retry { delay } => {
                        warn!(
                            endpoint = descriptor.url.as_str(),
                            attempt = attempts,
                            retries_left,
                            error = %err,
                            "request attempt failed, retrying"
                        );
                        retries_left -= 1;
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    Decision::Fail => {
                        info!(
                            endpoint = descriptor.url.as_str(),
                            attempts,
                            duration_ms = start.elapsed().as_millis(),
                            error = %err,
                            "request failed"
                        );
                        return Err(err);
                    }
                },
            }
        }
    }

    /// One attempt under the descriptor's deadline. The timer lives inside the
    /// `timeout` future and is released on every path.
    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
        request_id: &str,
    ) -> Result<(Bytes, Option<String>)> {
        match tokio::time::timeout(descriptor.timeout, self.send_once(descriptor, request_id)).await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                timeout_ms: descriptor.timeout.as_millis() as u64,
                context: ErrorContext::new()
                    .with_endpoint(descriptor.url.clone())
                    .with_request_id(request_id)
                    .with_source("http_transport"),
            }),
        }
    }

    async fn send_once(
        &self,
        descriptor: &RequestDescriptor,
        request_id: &str,
    ) -> Result<(Bytes, Option<String>)> {
        let mut req = self
            .client
            .request(descriptor.method.clone(), &descriptor.url)
            .header("x-request-id", request_id);

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        for (name, value) in &descriptor.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if !descriptor.query.is_empty() {
            req = req.query(&descriptor.query);
        }
        req = match &descriptor.body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(value),
            RequestBody::Multipart(body) => req.multipart(body.to_form()?),
        };

        let resp = req.send().await.map_err(TransportError::Http)?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = resp.bytes().await.map_err(TransportError::Http)?;

        if !status.is_success() {
            return Err(service_error(status, &body));
        }
        Ok((body, content_type))
    }
}

/// Build a service error from a non-success response.
pub(crate) fn service_error(status: StatusCode, body: &[u8]) -> Error {
    let message = error_message_from_body(body).unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        )
    });
    Error::Service {
        status: status.as_u16(),
        message,
    }
}

fn error_message_from_body(body: &[u8]) -> Option<String> {
    let json: serde_json::Value = serde_json::from_slice(body).ok()?;
    let field = json
        .get("error")
        .or_else(|| json.get("detail"))
        .or_else(|| json.get("message"))?;
    match field {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
