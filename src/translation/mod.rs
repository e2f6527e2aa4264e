//! 翻译模块：单条、批量翻译与支持语言列表。

mod client;
mod types;

pub use types::{
    BatchTranslationRequest, BatchTranslationResult, Language, LanguageCatalog,
    TranslationRequest, TranslationResult,
};
