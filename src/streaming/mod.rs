//! 流式转录：基于 WebSocket 的持久双工会话。
//!
//! Streaming transcription over a persistent duplex connection.

pub mod frame;
pub mod session;

pub use frame::{
    decode_chunk, encode_chunk, parse_inbound, FinalTranscript, InboundMessage, OutboundFrame,
    PartialTranscript, StreamConfig,
};
pub use session::{SessionEvent, SessionEvents, SessionState, StreamingSession};

use crate::{Error, ErrorContext, Result};
use url::Url;

/// Derive the WebSocket address of the streaming endpoint from an HTTP base URL.
///
/// Keeps host, port and any base path; upgrades `http` to `ws` and `https` to `wss`.
pub fn streaming_url(base_url: &str, path: &str) -> Result<String> {
    let mut url = Url::parse(base_url).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid stt_url: {}", e),
            ErrorContext::new().with_source("streaming_url"),
        )
    })?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(Error::configuration(format!(
                "cannot derive a streaming address from scheme '{}'",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| Error::configuration(format!("cannot switch {} to {}", base_url, scheme)))?;

    let joined = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(None);
    Ok(url.to_string())
}
