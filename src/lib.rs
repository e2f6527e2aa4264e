//! # ai-voice-rust
//!
//! 统一的翻译、语音转文字（STT）与文字转语音（TTS）异步客户端。
//!
//! Unified async client for three independent remote services: text
//! translation, speech-to-text and text-to-speech.
//!
//! ## Overview
//!
//! Every request-response call goes through one transport that enforces a
//! per-attempt deadline and a bounded, sequential retry budget. Streaming
//! transcription runs over a persistent WebSocket session that publishes typed
//! events to the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_voice_rust::{TranslationRequest, VoiceClient};
//!
//! #[tokio::main]
//! async fn main() -> ai_voice_rust::Result<()> {
//!     let client = VoiceClient::builder()
//!         .translation_url("http://localhost:8001")
//!         .retries(2)
//!         .build()?;
//!
//!     let result = client
//!         .translate(&TranslationRequest::new("Hello world", "en", "ht"))
//!         .await?;
//!     println!("{} ({:.2})", result.translated_text, result.confidence);
//!
//!     let health = client.health_check().await;
//!     println!("all services up: {}", health.all_healthy());
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming transcription
//!
//! ```rust,no_run
//! use ai_voice_rust::{SessionEvent, SttOptions, VoiceClient};
//!
//! # async fn run(client: VoiceClient, chunks: Vec<Vec<u8>>) -> ai_voice_rust::Result<()> {
//! let (session, mut events) = client.transcribe_stream(&SttOptions::default().language("en"))?;
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SessionEvent::Opened => {
//!             for chunk in &chunks {
//!                 session.send(chunk);
//!             }
//!             session.stop();
//!         }
//!         SessionEvent::Partial(p) => println!("... {}", p.text),
//!         SessionEvent::Final(f) => println!("{}", f.text),
//!         SessionEvent::Error(e) => eprintln!("stream error: {}", e),
//!         SessionEvent::Closed => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | `VoiceClient`, builder, retry policy and health checks |
//! | [`config`] | Client configuration and defaults |
//! | [`transport`] | Deadline-bounded HTTP execution with retry |
//! | [`streaming`] | WebSocket transcription sessions and framing |
//! | [`translation`] | Translation operations and types |
//! | [`stt`] | Speech-to-text operations and types |
//! | [`tts`] | Text-to-speech operations and types |

pub mod client;
pub mod config;
pub mod streaming;
pub mod stt;
pub mod transport;
pub mod translation;
pub mod tts;

// Re-export main types for convenience
pub use client::{HealthStatus, Service, VoiceClient, VoiceClientBuilder};
pub use config::ClientConfig;
pub use streaming::{
    FinalTranscript, PartialTranscript, SessionEvent, SessionEvents, SessionState,
    StreamingSession,
};
pub use stt::{AudioInput, LanguageDetection, SttOptions, Transcription};
pub use translation::{
    BatchTranslationRequest, BatchTranslationResult, Language, LanguageCatalog,
    TranslationRequest, TranslationResult,
};
pub use tts::{AudioFormat, AudioOutput, TtsOptions, Voice, VoiceCatalog};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
