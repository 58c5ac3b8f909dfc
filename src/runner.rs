//! Run controller: decides what to translate and keeps the ledger.
//!
//! Candidates are the documents in the source directory with the configured
//! extension, in filename order. Each one is classified by exclusion list,
//! markers and ledger membership; the resulting languages are translated one
//! after another and the filename is recorded once.

use crate::error::{PipelineError, PipelineResult};
use crate::gateway::{TextGenerator, TranslationGateway};
use crate::i18n::LanguageConfig;
use crate::ledger::Ledger;
use crate::settings::Settings;
use crate::translator::DocumentTranslator;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Why a document gets translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Force marker present, ledger ignored
    Forced,
    /// Written in the source language, not yet recorded
    WrittenInSource,
    /// Not yet recorded
    New,
}

/// What happens to one candidate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'s> {
    Excluded,
    AlreadyRecorded,
    Translate {
        reason: Reason,
        languages: Vec<&'s LanguageConfig>,
    },
}

/// Classify a document. Checks run in a fixed order: exclusion list, force
/// marker, ledger, written-in-source marker.
pub fn decide<'s>(
    filename: &str,
    content: &str,
    ledger: &Ledger,
    settings: &'s Settings,
) -> Decision<'s> {
    let markers = &settings.markers;
    let languages = &settings.languages;
    let written_in_source = content.contains(&markers.written_in_source);

    let targets = move |skip_source: bool| {
        if skip_source {
            languages.list_excluding_source()
        } else {
            languages.list_all()
        }
    };

    if settings.is_excluded(filename) {
        Decision::Excluded
    } else if content.contains(&markers.force_translate) {
        Decision::Translate {
            reason: Reason::Forced,
            languages: targets(written_in_source),
        }
    } else if ledger.contains(filename) {
        Decision::AlreadyRecorded
    } else if written_in_source {
        Decision::Translate {
            reason: Reason::WrittenInSource,
            languages: targets(true),
        }
    } else {
        Decision::Translate {
            reason: Reason::New,
            languages: targets(false),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents translated, in processing order
    pub translated: Vec<String>,
    /// Files written, one per (document, language)
    pub outputs: Vec<PathBuf>,
    pub skipped_excluded: usize,
    pub skipped_recorded: usize,
    /// Filenames newly added to the ledger
    pub recorded: usize,
}

pub struct Runner<'a, G> {
    settings: &'a Settings,
    gateway: &'a TranslationGateway<G>,
}

impl<'a, G: TextGenerator> Runner<'a, G> {
    pub fn new(settings: &'a Settings, gateway: &'a TranslationGateway<G>) -> Self {
        Self { settings, gateway }
    }

    /// Candidate filenames, sorted.
    pub fn candidates(&self) -> PipelineResult<Vec<String>> {
        let dir = &self.settings.source_dir;
        let entries = fs::read_dir(dir).map_err(|e| PipelineError::read(dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PipelineError::read(dir, e))?.path();
            let matches_extension = path
                .extension()
                .is_some_and(|ext| ext == self.settings.extension.as_str());
            if !matches_extension || !path.is_file() {
                continue;
            }
            match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => names.push(name.to_string()),
                None => warn!("Skipping non UTF-8 filename: {}", path.display()),
            }
        }

        names.sort();
        Ok(names)
    }

    /// Decisions for every candidate, without translating or writing anything.
    pub fn plan(&self) -> PipelineResult<Vec<(String, Decision<'a>)>> {
        let ledger = Ledger::load(&self.settings.ledger_path)?;

        let mut plan = Vec::new();
        for filename in self.candidates()? {
            let content = self.read(&filename)?;
            let decision = decide(&filename, &content, &ledger, self.settings);
            plan.push((filename, decision));
        }
        Ok(plan)
    }

    /// Translate every candidate that needs it. Stops at the first error.
    pub async fn run(&self) -> PipelineResult<RunSummary> {
        let mut ledger = Ledger::open(&self.settings.ledger_path)?;
        let translator = DocumentTranslator::new(self.settings, self.gateway);
        let mut summary = RunSummary::default();

        for filename in self.candidates()? {
            let content = self.read(&filename)?;

            let (reason, languages) = match decide(&filename, &content, &ledger, self.settings) {
                Decision::Excluded => {
                    info!("Pass the post in exclude list: {}", filename);
                    summary.skipped_excluded += 1;
                    continue;
                }
                Decision::AlreadyRecorded => {
                    info!("Pass the post in ledger: {}", filename);
                    summary.skipped_recorded += 1;
                    continue;
                }
                Decision::Translate { reason, languages } => (reason, languages),
            };

            if languages.len() < self.settings.languages.list_all().len() {
                info!(
                    "Pass the {}-{} translation: {}",
                    self.settings.languages.source_code(),
                    self.settings.languages.source_code(),
                    filename
                );
            }
            if reason == Reason::Forced {
                info!("Force translating: {}", filename);
            }

            let source = self.settings.source_dir.join(&filename);
            for language in languages {
                let output = translator.translate_file(&source, &filename, language).await?;
                summary.outputs.push(output);
            }

            if ledger.record(&filename)? {
                summary.recorded += 1;
            }
            summary.translated.push(filename);
        }

        info!(
            "Run complete: {} translated, {} outputs, {} excluded, {} already recorded",
            summary.translated.len(),
            summary.outputs.len(),
            summary.skipped_excluded,
            summary.skipped_recorded
        );
        Ok(summary)
    }

    fn read(&self, filename: &str) -> PipelineResult<String> {
        let path = self.settings.source_dir.join(filename);
        fs::read_to_string(&path).map_err(|e| PipelineError::read(&path, e))
    }
}
