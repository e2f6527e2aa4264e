use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Endpoint the failing request targeted (e.g. "http://localhost:8001/translate").
    pub endpoint: Option<String>,
    /// Number of attempts made before the error surfaced.
    pub attempts: Option<u32>,
    /// Client-generated request id of the last attempt.
    pub request_id: Option<String>,
    /// Source of the error (e.g. "http_transport", "client_config").
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the voice client.
///
/// Every failure an operation can surface falls into one of these categories.
/// Stream errors are never returned from a call; they are delivered through
/// the session event stream.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Request timed out after {timeout_ms}ms{}", format_context(.context))]
    Timeout { timeout_ms: u64, context: ErrorContext },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Service error: HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Decode error: {message}{}", format_context(.context))]
    Decode { message: String, context: ErrorContext },

    #[error("Stream parse error: {0}")]
    StreamParse(String),

    #[error("Stream connection error: {0}")]
    StreamConnection(String),

    #[error("Remote stream error: {0}")]
    StreamNotice(String),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration { message: String, context: ErrorContext },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref endpoint) = ctx.endpoint {
        parts.push(format!("endpoint: {}", endpoint));
    }
    if let Some(attempts) = ctx.attempts {
        parts.push(format!("attempts: {}", attempts));
    }
    if let Some(ref id) = ctx.request_id {
        parts.push(format!("request_id: {}", id));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn decode_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Decode {
            message: msg.into(),
            context,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// HTTP status of a service error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Timeout { context, .. }
            | Error::Decode { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}
