//! TTS (Text-to-Speech) types.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Audio output from TTS.
#[derive(Debug, Clone)]
pub struct AudioOutput {
    pub data: Bytes,
    pub format: AudioFormat,
}

impl AudioOutput {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        tokio::fs::write(path, &self.data).await
    }
}

/// Supported audio formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Opus,
    Ogg,
    Flac,
    Wav,
    Pcm,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
            Self::Pcm => "audio/pcm",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }

    /// Infer the format from a `content-type` header; unknown types map to mp3.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match essence.as_str() {
            "audio/opus" => Self::Opus,
            "audio/ogg" => Self::Ogg,
            "audio/flac" | "audio/x-flac" => Self::Flac,
            "audio/wav" | "audio/x-wav" | "audio/wave" => Self::Wav,
            "audio/pcm" | "audio/l16" => Self::Pcm,
            _ => Self::Mp3,
        }
    }
}

/// Options for TTS synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct TtsOptions {
    pub language: String,
    pub voice: Option<String>,
    pub speed: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            voice: None,
            speed: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<&'a str>,
    pub speed: f32,
    pub pitch: f32,
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct VoicePreviewRequest<'a> {
    pub voice_id: &'a str,
    pub language: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCatalog {
    pub voices: Vec<Voice>,
}
