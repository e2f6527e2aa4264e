//! STT（语音转文字）模块：文件转录、语言检测与流式转录。

mod client;
mod types;

pub use types::{AudioInput, LanguageDetection, SttOptions, Transcription};
