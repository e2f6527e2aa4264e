//! STT (Speech-to-Text) operations.

use super::types::{AudioInput, LanguageDetection, SttOptions, Transcription};
use crate::client::{Service, VoiceClient};
use crate::streaming::{streaming_url, SessionEvents, StreamConfig, StreamingSession};
use crate::transport::{MultipartBody, RequestDescriptor};
use crate::{Error, Result};

impl VoiceClient {
    pub async fn transcribe(
        &self,
        audio: &AudioInput,
        options: &SttOptions,
    ) -> Result<Transcription> {
        let mut form = audio_form(audio)?;
        if let Some(lang) = &options.language {
            form = form.text("language", lang.clone());
        }
        if let Some(model) = &options.model {
            form = form.text("model", model.clone());
        }
        let url = self.endpoint(Service::Stt, "/transcribe");
        let descriptor = self.with_defaults(RequestDescriptor::post_multipart(url, form));
        self.transport.invoke(&descriptor).await
    }

    pub async fn detect_language(&self, audio: &AudioInput) -> Result<LanguageDetection> {
        let url = self.endpoint(Service::Stt, "/detect-language");
        let descriptor =
            self.with_defaults(RequestDescriptor::post_multipart(url, audio_form(audio)?));
        self.transport.invoke(&descriptor).await
    }

    /// Open a streaming transcription session on the STT host.
    ///
    /// Returns immediately; the session connects in the background. Must be
    /// called from within a Tokio runtime.
    pub fn transcribe_stream(
        &self,
        options: &SttOptions,
    ) -> Result<(StreamingSession, SessionEvents)> {
        let url = streaming_url(&self.config.stt_url, &self.config.streaming_path)?;
        let config = StreamConfig {
            language: options.language.clone(),
            model: options.model.clone(),
        };
        Ok(StreamingSession::open(url, config, self.config.timeout))
    }
}

fn audio_form(audio: &AudioInput) -> Result<MultipartBody> {
    if audio.data.is_empty() {
        return Err(Error::configuration("audio payload is empty"));
    }
    Ok(MultipartBody::new().file(
        "audio",
        audio.file_name.clone(),
        audio.mime.clone(),
        audio.data.clone(),
    ))
}
