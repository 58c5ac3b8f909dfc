//! Per-document, per-language translation.
//!
//! A document goes through a fixed sequence of stages for each target
//! language. Every stage but body translation is a pure transform of the text
//! in memory; body translation calls the generator once per chunk, one at a
//! time, in document order.

use crate::chunker;
use crate::error::{PipelineError, PipelineResult};
use crate::front_matter::{self, FrontMatter};
use crate::gateway::{TextGenerator, TranslationGateway};
use crate::i18n::LanguageConfig;
use crate::placeholder;
use crate::settings::{Markers, Settings};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    HeaderExtracted,
    MarkersStripped,
    PlaceholdersProtected,
    BodyChunkedTranslated,
    FooterAppended,
    PlaceholdersRestored,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::HeaderExtracted => "header extracted",
            Stage::MarkersStripped => "markers stripped",
            Stage::PlaceholdersProtected => "placeholders protected",
            Stage::BodyChunkedTranslated => "body translated",
            Stage::FooterAppended => "footer appended",
            Stage::PlaceholdersRestored => "placeholders restored",
            Stage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// A document with its front matter cut off and its markers removed.
#[derive(Debug)]
pub struct Prepared {
    pub front_matter: Option<FrontMatter>,
    /// The text that gets protected, chunked and translated
    pub body: String,
}

/// Cut off the front matter and strip markers, exactly as the body is sent
/// for translation. The written-in-source marker stays when
/// `keep_written_in_source` is set.
///
/// A block that is not usable front matter stays in the body.
pub fn prepare(
    content: &str,
    filename: &str,
    markers: &Markers,
    keep_written_in_source: bool,
) -> Prepared {
    let (front_matter, body) = match front_matter::extract(content) {
        Ok(Some(extracted)) => (Some(extracted.front_matter), extracted.body),
        Ok(None) => (None, content),
        Err(e) => {
            warn!("Skipping front matter of {}: {}", filename, e);
            (None, content)
        }
    };

    // Blank lines after the closing fence belong to the header; markers are
    // stripped first since they need their leading newline to match
    let mut body = markers.strip(body, keep_written_in_source);
    if front_matter.is_some() {
        body = body.trim_start_matches('\n').to_string();
    }

    Prepared { front_matter, body }
}

pub struct DocumentTranslator<'a, G> {
    settings: &'a Settings,
    gateway: &'a TranslationGateway<G>,
}

impl<'a, G: TextGenerator> DocumentTranslator<'a, G> {
    pub fn new(settings: &'a Settings, gateway: &'a TranslationGateway<G>) -> Self {
        Self { settings, gateway }
    }

    /// Translate the file at `source` into `language` and write it to the
    /// language's output directory under `filename`.
    pub async fn translate_file(
        &self,
        source: &Path,
        filename: &str,
        language: &LanguageConfig,
    ) -> PipelineResult<PathBuf> {
        info!("Translating into {}: {}", language.code, filename);

        let content = fs::read_to_string(source).map_err(|e| PipelineError::read(source, e))?;
        let translated = self.translate_text(&content, filename, language).await?;
        let output = self.persist(filename, language, &translated)?;
        self.enter(Stage::Persisted, filename, language);

        Ok(output)
    }

    /// Run every stage up to, not including, persistence.
    pub async fn translate_text(
        &self,
        content: &str,
        filename: &str,
        language: &LanguageConfig,
    ) -> PipelineResult<String> {
        self.enter(Stage::Start, filename, language);

        let Prepared { front_matter, body } = prepare(
            content,
            filename,
            &self.settings.markers,
            self.settings.languages.is_source(language.code),
        );
        self.enter(Stage::HeaderExtracted, filename, language);
        self.enter(Stage::MarkersStripped, filename, language);

        let header = match front_matter {
            Some(front_matter) => Some(
                front_matter
                    .translate(self.gateway, language, &self.settings.header_keys)
                    .await?,
            ),
            None => None,
        };

        let protected = placeholder::protect(&body, &self.settings.rules, language.code);
        self.enter(Stage::PlaceholdersProtected, filename, language);

        let body = self.translate_body(&protected.text, filename, language).await?;
        self.enter(Stage::BodyChunkedTranslated, filename, language);

        let mut text = match header {
            Some(block) => front_matter::render(&block, &body),
            None => body,
        };
        text.push_str(chunker::PARAGRAPH_SEPARATOR);
        text.push_str(language.strings.translated_notice);
        self.enter(Stage::FooterAppended, filename, language);

        let text = placeholder::restore(&text, &protected.restorations);
        let leaked = placeholder::leaked_tokens(&text);
        if !leaked.is_empty() {
            warn!(
                "Placeholders left in {} ({}): {:?}",
                filename, language.code, leaked
            );
        }
        self.enter(Stage::PlaceholdersRestored, filename, language);

        Ok(text)
    }

    async fn translate_body(
        &self,
        body: &str,
        filename: &str,
        language: &LanguageConfig,
    ) -> PipelineResult<String> {
        let chunks = chunker::chunk(body, self.settings.max_chunk_length);
        let total = chunks.len();

        let mut translated = Vec::with_capacity(total);
        for (i, chunk) in chunks.iter().enumerate() {
            debug!(
                "{} ({}): chunk {}/{} ({} chars)",
                filename,
                language.code,
                i + 1,
                total,
                chunk.chars().count()
            );
            translated.push(self.gateway.translate_body(chunk, language).await?);
        }

        Ok(chunker::reassemble(&translated))
    }

    fn persist(
        &self,
        filename: &str,
        language: &LanguageConfig,
        text: &str,
    ) -> PipelineResult<PathBuf> {
        fs::create_dir_all(&language.output_dir).map_err(|source| PipelineError::CreateDir {
            path: language.output_dir.clone(),
            source,
        })?;

        let output = language.output_dir.join(filename);
        fs::write(&output, text).map_err(|e| PipelineError::write(&output, e))?;
        Ok(output)
    }

    fn enter(&self, stage: Stage, filename: &str, language: &LanguageConfig) {
        debug!("{} ({}): {}", filename, language.code, stage);
    }
}
