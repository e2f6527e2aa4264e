//! TTS（文字转语音）模块：语音合成、音色列表与试听。

mod client;
mod types;

pub use types::{AudioFormat, AudioOutput, TtsOptions, Voice, VoiceCatalog};
