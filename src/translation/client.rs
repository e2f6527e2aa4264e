//! Translation operations.

use super::types::{
    BatchTranslationRequest, BatchTranslationResult, LanguageCatalog, TranslationRequest,
    TranslationResult,
};
use crate::client::{Service, VoiceClient};
use crate::transport::RequestDescriptor;
use crate::{Error, Result};

impl VoiceClient {
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let url = self.endpoint(Service::Translation, "/translate");
        let descriptor = self.with_defaults(RequestDescriptor::post(url, request)?);
        self.transport.invoke(&descriptor).await
    }

    /// Shorthand for [`VoiceClient::translate`].
    pub async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<TranslationResult> {
        self.translate(&TranslationRequest::new(text, source_language, target_language))
            .await
    }

    pub async fn translate_batch(
        &self,
        request: &BatchTranslationRequest,
    ) -> Result<BatchTranslationResult> {
        if request.target_languages.is_empty() {
            return Err(Error::configuration(
                "batch translation needs at least one target language",
            ));
        }
        let url = self.endpoint(Service::Translation, "/translate/batch");
        let descriptor = self.with_defaults(RequestDescriptor::post(url, request)?);
        self.transport.invoke(&descriptor).await
    }

    pub async fn supported_languages(&self) -> Result<LanguageCatalog> {
        let url = self.endpoint(Service::Translation, "/languages");
        let descriptor = self.with_defaults(RequestDescriptor::get(url));
        self.transport.invoke(&descriptor).await
    }
}
