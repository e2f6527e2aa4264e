//! 客户端配置：三个后端服务地址、超时与重试参数。
//!
//! Client configuration. All defaults live here; nothing else in the crate
//! holds process-wide settings.

use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TRANSLATION_URL: &str = "http://localhost:8001";
pub const DEFAULT_STT_URL: &str = "http://localhost:8002";
pub const DEFAULT_TTS_URL: &str = "http://localhost:8003";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_STREAMING_PATH: &str = "/ws/transcribe";

/// Configuration for [`crate::VoiceClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub translation_url: String,
    pub stt_url: String,
    pub tts_url: String,
    /// Deadline applied to every attempt of a request.
    pub timeout: Duration,
    /// Retry budget: a request is attempted at most `retries + 1` times.
    pub retries: u32,
    /// Fixed pause between consecutive attempts.
    pub retry_delay: Duration,
    /// Whether 4xx responses consume retry budget like any other failure.
    pub retry_client_errors: bool,
    pub health_timeout: Duration,
    /// Path of the streaming transcription endpoint on the STT host.
    pub streaming_path: String,
    /// Optional bearer token sent to all three services.
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            translation_url: DEFAULT_TRANSLATION_URL.to_string(),
            stt_url: DEFAULT_STT_URL.to_string(),
            tts_url: DEFAULT_TTS_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_client_errors: true,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            streaming_path: DEFAULT_STREAMING_PATH.to_string(),
            api_key: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by environment variables:
    ///
    /// - `AI_VOICE_TRANSLATION_URL`, `AI_VOICE_STT_URL`, `AI_VOICE_TTS_URL`
    /// - `AI_VOICE_TIMEOUT_SECS`, `AI_VOICE_RETRIES`, `AI_VOICE_RETRY_DELAY_MS`
    /// - `AI_VOICE_API_KEY`
    ///
    /// Unparseable numeric values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("AI_VOICE_TRANSLATION_URL") {
            cfg.translation_url = v;
        }
        if let Some(v) = lookup("AI_VOICE_STT_URL") {
            cfg.stt_url = v;
        }
        if let Some(v) = lookup("AI_VOICE_TTS_URL") {
            cfg.tts_url = v;
        }
        if let Some(secs) = lookup("AI_VOICE_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = lookup("AI_VOICE_RETRIES").and_then(|s| s.parse::<u32>().ok()) {
            cfg.retries = n;
        }
        if let Some(ms) = lookup("AI_VOICE_RETRY_DELAY_MS").and_then(|s| s.parse::<u64>().ok()) {
            cfg.retry_delay = Duration::from_millis(ms);
        }
        cfg.api_key = lookup("AI_VOICE_API_KEY").filter(|k| !k.trim().is_empty());
        cfg
    }

    /// Reject malformed base addresses and zero deadlines before any request is made.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("translation_url", &self.translation_url),
            ("stt_url", &self.stt_url),
            ("tts_url", &self.tts_url),
        ] {
            let parsed = Url::parse(value).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid {}: {}", field, e),
                    ErrorContext::new().with_source("client_config"),
                )
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::configuration_with_context(
                    format!("{} must use http or https, got '{}'", field, parsed.scheme()),
                    ErrorContext::new().with_source("client_config"),
                ));
            }
        }
        if self.timeout.is_zero() {
            return Err(Error::configuration("timeout must be greater than zero"));
        }
        Ok(())
    }
}
