use crate::client::core::VoiceClient;
use crate::config::ClientConfig;
use crate::Result;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Starts from [`ClientConfig::default`]; use [`VoiceClientBuilder::from_env`]
/// to start from the environment instead.
#[derive(Debug, Clone, Default)]
pub struct VoiceClientBuilder {
    config: ClientConfig,
}

impl VoiceClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env(),
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn translation_url(mut self, url: impl Into<String>) -> Self {
        self.config.translation_url = url.into();
        self
    }

    pub fn stt_url(mut self, url: impl Into<String>) -> Self {
        self.config.stt_url = url.into();
        self
    }

    pub fn tts_url(mut self, url: impl Into<String>) -> Self {
        self.config.tts_url = url.into();
        self
    }

    /// Per-attempt deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Treat 4xx responses as terminal instead of retrying them.
    pub fn retry_client_errors(mut self, enable: bool) -> Self {
        self.config.retry_client_errors = enable;
        self
    }

    pub fn health_timeout(mut self, timeout: Duration) -> Self {
        self.config.health_timeout = timeout;
        self
    }

    pub fn streaming_path(mut self, path: impl Into<String>) -> Self {
        self.config.streaming_path = path.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    pub fn build(self) -> Result<VoiceClient> {
        VoiceClient::new(self.config)
    }
}
