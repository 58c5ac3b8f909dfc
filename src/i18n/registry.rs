//! Language registry: the set of output languages for one run.
//!
//! The registry is built once at startup from the output root and then passed
//! by reference to everything that needs to know the target languages.

use crate::i18n::strings::{LanguageStrings, ARABIC_STRINGS, ENGLISH_STRINGS, SPANISH_STRINGS};
use std::path::{Path, PathBuf};

/// Configuration for an output language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es", "ar")
    pub code: &'static str,

    /// English name of the language, used inside prompts (e.g., "Spanish")
    pub name: &'static str,

    /// Directory that receives documents translated into this language
    pub output_dir: PathBuf,

    /// Localized strings for this language
    pub strings: &'static LanguageStrings,
}

impl LanguageConfig {
    pub fn new(
        code: &'static str,
        name: &'static str,
        output_dir: impl Into<PathBuf>,
        strings: &'static LanguageStrings,
    ) -> Self {
        Self {
            code,
            name,
            output_dir: output_dir.into(),
            strings,
        }
    }
}

/// Ordered set of output languages plus the pipeline's source language.
///
/// The source language is the one documents are assumed to be written in
/// when they carry the written-in-source marker. It may or may not be one of
/// the output languages.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
    source_code: &'static str,
}

impl LanguageRegistry {
    pub fn new(languages: Vec<LanguageConfig>, source_code: &'static str) -> Self {
        Self {
            languages,
            source_code,
        }
    }

    /// English, Spanish and Arabic, each written to `<output_root>/<code>`.
    /// English is the source language.
    pub fn defaults(output_root: &Path) -> Self {
        Self::new(
            vec![
                LanguageConfig::new("en", "English", output_root.join("en"), &ENGLISH_STRINGS),
                LanguageConfig::new("es", "Spanish", output_root.join("es"), &SPANISH_STRINGS),
                LanguageConfig::new("ar", "Arabic", output_root.join("ar"), &ARABIC_STRINGS),
            ],
            "en",
        )
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All output languages, in registry order.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// All output languages except the source language, in registry order.
    pub fn list_excluding_source(&self) -> Vec<&LanguageConfig> {
        self.languages
            .iter()
            .filter(|lang| !self.is_source(lang.code))
            .collect()
    }

    pub fn source_code(&self) -> &'static str {
        self.source_code
    }

    pub fn is_source(&self, code: &str) -> bool {
        self.source_code == code
    }
}
