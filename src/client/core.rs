use crate::client::builder::VoiceClientBuilder;
use crate::config::ClientConfig;
use crate::transport::{HttpTransport, RequestDescriptor};
use crate::Result;
use std::fmt;
use std::time::Duration;

/// The three backing services a [`VoiceClient`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Translation,
    Stt,
    Tts,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Translation, Service::Stt, Service::Tts];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Translation => "translation",
            Service::Stt => "stt",
            Service::Tts => "tts",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unified client for the translation, speech-to-text and text-to-speech services.
///
/// Operations live next to their request/response types:
/// [`crate::translation`], [`crate::stt`], [`crate::tts`], plus
/// [`VoiceClient::health_check`].
#[derive(Debug, Clone)]
pub struct VoiceClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: HttpTransport,
}

impl VoiceClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }

    /// Build a client from `AI_VOICE_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn builder() -> VoiceClientBuilder {
        VoiceClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Translation => &self.config.translation_url,
            Service::Stt => &self.config.stt_url,
            Service::Tts => &self.config.tts_url,
        }
    }

    pub(crate) fn endpoint(&self, service: Service, path: &str) -> String {
        format!("{}{}", self.base_url(service).trim_end_matches('/'), path)
    }

    /// Apply the configured deadline and retry budget.
    pub(crate) fn with_defaults(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        descriptor
            .with_timeout(self.config.timeout)
            .with_retries(self.config.retries)
    }

    pub fn set_translation_url(&mut self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        self.update(|c| c.translation_url = url)
    }

    pub fn set_stt_url(&mut self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        self.update(|c| c.stt_url = url)
    }

    pub fn set_tts_url(&mut self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        self.update(|c| c.tts_url = url)
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.update(|c| c.timeout = timeout)
    }

    pub fn set_retries(&mut self, retries: u32) -> Result<()> {
        self.update(|c| c.retries = retries)
    }

    pub fn set_retry_delay(&mut self, delay: Duration) -> Result<()> {
        self.update(|c| c.retry_delay = delay)
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) -> Result<()> {
        self.update(|c| c.api_key = api_key)
    }

    /// Validate the changed config before it replaces the current one.
    fn update<F: FnOnce(&mut ClientConfig)>(&mut self, f: F) -> Result<()> {
        let mut next = self.config.clone();
        f(&mut next);
        next.validate()?;
        self.transport.apply_config(&next);
        self.config = next;
        Ok(())
    }
}
