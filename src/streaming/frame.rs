//! Wire framing for the streaming transcription session.
//!
//! Every frame is a JSON text message shaped `{"type": ..., "data": ...}`.

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Configuration carried by the first outbound frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Frames sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OutboundFrame {
    Config(StreamConfig),
    /// Base64-encoded audio bytes.
    AudioChunk(String),
    Stop,
}

impl OutboundFrame {
    pub fn audio_chunk(chunk: &[u8]) -> Self {
        OutboundFrame::AudioChunk(encode_chunk(chunk))
    }

    /// The config frame for a session, if the caller asked for anything.
    pub fn config_for(config: &StreamConfig) -> Option<Self> {
        if config.language.is_none() && config.model.is_none() {
            None
        } else {
            Some(OutboundFrame::Config(config.clone()))
        }
    }

    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::StreamParse(format!("failed to encode frame: {}", e)))
    }
}

pub fn encode_chunk(chunk: &[u8]) -> String {
    STANDARD.encode(chunk)
}

pub fn decode_chunk(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| Error::StreamParse(format!("invalid audio chunk encoding: {}", e)))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PartialTranscript {
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinalTranscript {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Messages received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    ConfigAck,
    PartialTranscript(PartialTranscript),
    FinalTranscript(FinalTranscript),
    ErrorNotice { message: String },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

const PARSE_FAILURE: &str = "failed to parse streaming message";

/// Parse one inbound text frame.
///
/// Returns `Ok(None)` for well-formed frames with a tag this client does not
/// know, which callers drop.
pub fn parse_inbound(text: &str) -> Result<Option<InboundMessage>> {
    let envelope: Envelope = serde_json::from_str(text)
        .map_err(|e| Error::StreamParse(format!("{}: {}", PARSE_FAILURE, e)))?;

    let message = match envelope.kind.as_str() {
        "config_ack" => InboundMessage::ConfigAck,
        "partial_transcript" => InboundMessage::PartialTranscript(
            serde_json::from_value(envelope.data)
                .map_err(|e| Error::StreamParse(format!("{}: {}", PARSE_FAILURE, e)))?,
        ),
        "final_transcript" => InboundMessage::FinalTranscript(
            serde_json::from_value(envelope.data)
                .map_err(|e| Error::StreamParse(format!("{}: {}", PARSE_FAILURE, e)))?,
        ),
        "error" => InboundMessage::ErrorNotice {
            message: notice_message(&envelope.data),
        },
        _ => return Ok(None),
    };
    Ok(Some(message))
}

fn notice_message(data: &serde_json::Value) -> String {
    match data {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| data.to_string()),
        serde_json::Value::Null => "unknown stream error".to_string(),
        other => other.to_string(),
    }
}
