//! STT (Speech-to-Text) types.

use serde::{Deserialize, Serialize};

/// Transcription result from STT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Audio duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetection {
    pub detected_language: String,
    pub confidence: f64,
}

/// Audio payload uploaded to the STT service.
#[derive(Debug, Clone)]
pub struct AudioInput {
    pub data: bytes::Bytes,
    pub file_name: String,
    pub mime: String,
}

impl AudioInput {
    /// WAV audio with a default file name.
    pub fn wav(data: impl Into<bytes::Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: "audio.wav".to_string(),
            mime: "audio/wav".to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }
}

/// Options for STT transcription.
#[derive(Debug, Clone, Default)]
pub struct SttOptions {
    pub language: Option<String>,
    pub model: Option<String>,
}

impl SttOptions {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
