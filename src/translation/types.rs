//! Translation types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub confidence: f64,
}

/// One source text translated into several target languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTranslationResult {
    /// Keyed by target language code.
    pub translations: HashMap<String, TranslationResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
    pub native_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCatalog {
    pub supported_languages: Vec<Language>,
}

impl LanguageCatalog {
    pub fn find(&self, code: &str) -> Option<&Language> {
        self.supported_languages
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(code))
    }
}
