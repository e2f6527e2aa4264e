//! TTS (Text-to-Speech) operations.

use super::types::{
    AudioFormat, AudioOutput, SynthesisRequest, TtsOptions, VoiceCatalog, VoicePreviewRequest,
};
use crate::client::{Service, VoiceClient};
use crate::transport::{RawResponse, RequestDescriptor};
use crate::{Error, Result};

impl VoiceClient {
    pub async fn synthesize(&self, text: &str, options: &TtsOptions) -> Result<AudioOutput> {
        if text.trim().is_empty() {
            return Err(Error::configuration("text to synthesize is empty"));
        }
        let body = SynthesisRequest {
            text,
            language: &options.language,
            voice: options.voice.as_deref(),
            speed: options.speed,
            pitch: options.pitch,
            volume: options.volume,
        };
        let url = self.endpoint(Service::Tts, "/synthesize");
        let descriptor = self.with_defaults(RequestDescriptor::post(url, &body)?);
        let raw = self.transport.invoke_raw(&descriptor).await?;
        Ok(audio_output(raw))
    }

    /// List available voices, optionally only those for one language.
    pub async fn voices(&self, language: Option<&str>) -> Result<VoiceCatalog> {
        let url = self.endpoint(Service::Tts, "/voices");
        let mut descriptor = RequestDescriptor::get(url);
        if let Some(lang) = language {
            descriptor = descriptor.with_query("language", lang);
        }
        let descriptor = self.with_defaults(descriptor);
        self.transport.invoke(&descriptor).await
    }

    pub async fn preview_voice(
        &self,
        voice_id: &str,
        language: &str,
        text: &str,
    ) -> Result<AudioOutput> {
        let body = VoicePreviewRequest {
            voice_id,
            language,
            text,
        };
        let url = self.endpoint(Service::Tts, "/voices/preview");
        let descriptor = self.with_defaults(RequestDescriptor::post(url, &body)?);
        let raw = self.transport.invoke_raw(&descriptor).await?;
        Ok(audio_output(raw))
    }
}

fn audio_output(raw: RawResponse) -> AudioOutput {
    AudioOutput {
        format: AudioFormat::from_content_type(raw.content_type.as_deref()),
        data: raw.body,
    }
}
