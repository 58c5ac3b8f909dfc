//! Curated pipeline settings: replacement rules, markers, exclusions and the
//! language set.
//!
//! Built once at startup from [`Config`] and passed by reference to every
//! component. Nothing here changes during a run.

use crate::config::Config;
use crate::i18n::LanguageRegistry;
use crate::placeholder::ReplacementRule;
use std::path::PathBuf;

/// In-body sentinels that steer which languages a document goes to.
#[derive(Debug, Clone)]
pub struct Markers {
    /// The document is written in the source language already
    pub written_in_source: String,
    /// Translate again even if the ledger has the document
    pub force_translate: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            written_in_source: "\n> This post was originally written in English.\n".to_string(),
            force_translate: "\n[translate]\n".to_string(),
        }
    }
}

impl Markers {
    /// Remove the markers from `text`. The force marker always goes; the
    /// written-in-source marker stays when `keep_written_in_source` is set.
    ///
    /// Markers on adjacent lines share a newline, so every occurrence is
    /// located in the original text before anything is removed.
    pub fn strip(&self, text: &str, keep_written_in_source: bool) -> String {
        let mut markers = vec![self.force_translate.as_str()];
        if !keep_written_in_source {
            markers.push(self.written_in_source.as_str());
        }

        let mut ranges = Vec::new();
        for marker in markers.into_iter().filter(|m| !m.is_empty()) {
            let step = marker.chars().next().map_or(1, char::len_utf8);
            let mut from = 0;
            while let Some(i) = text[from..].find(marker) {
                let start = from + i;
                ranges.push((start, start + marker.len()));
                from = start + step;
            }
        }
        ranges.sort_unstable();

        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        for (start, end) in ranges {
            if start > pos {
                out.push_str(&text[pos..start]);
            }
            pos = pos.max(end);
        }
        out.push_str(&text[pos..]);
        out
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub source_dir: PathBuf,
    pub ledger_path: PathBuf,
    /// Extension of candidate documents, without the dot
    pub extension: String,
    /// Filenames never translated nor recorded
    pub excluded: Vec<String>,
    pub languages: LanguageRegistry,
    pub rules: Vec<ReplacementRule>,
    pub markers: Markers,
    /// Front matter keys whose text values are translated
    pub header_keys: Vec<String>,
    pub max_chunk_length: usize,
}

impl Settings {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        ledger_path: impl Into<PathBuf>,
    ) -> Self {
        let output_root = output_root.into();
        Self {
            source_dir: source_dir.into(),
            ledger_path: ledger_path.into(),
            extension: "md".to_string(),
            excluded: ["index.md", "Contact-and-Subscribe.md", "WeChat.md"]
                .into_iter()
                .map(String::from)
                .collect(),
            languages: LanguageRegistry::defaults(&output_root),
            rules: default_rules(),
            markers: Markers::default(),
            header_keys: vec!["title".to_string()],
            max_chunk_length: 1800,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            max_chunk_length: config.max_chunk_length,
            ..Self::new(
                config.source_dir.clone(),
                config.output_root.clone(),
                config.ledger_path.clone(),
            )
        }
    }

    pub fn is_excluded(&self, filename: &str) -> bool {
        self.excluded.iter().any(|name| name == filename)
    }
}

/// Copyright lines and site links with a fixed translation per language.
fn default_rules() -> Vec<ReplacementRule> {
    vec![
        ReplacementRule::new(
            "> 原文地址：<https://wiki-power.com/>",
            [
                ("en", "> Original: <https://wiki-power.com/>"),
                ("es", "> Dirección original del artículo: <https://wiki-power.com/>"),
                ("ar", "> عنوان النص: <https://wiki-power.com/>"),
            ],
        ),
        ReplacementRule::new(
            "> 本篇文章受 [CC BY-NC-SA 4.0](https://creativecommons.org/licenses/by/4.0/deed.zh) 协议保护，转载请注明出处。",
            [
                ("en", "> This post is protected by [CC BY-NC-SA 4.0](https://creativecommons.org/licenses/by/4.0/deed.en) agreement, should be reproduced with attribution."),
                ("es", "> Este artículo está protegido por la licencia [CC BY-NC-SA 4.0](https://creativecommons.org/licenses/by/4.0/deed.zh). Si desea reproducirlo, por favor indique la fuente."),
                ("ar", "> يتم حماية هذا المقال بموجب اتفاقية [CC BY-NC-SA 4.0](https://creativecommons.org/licenses/by/4.0/deed.zh)، يُرجى ذكر المصدر عند إعادة النشر."),
            ],
        ),
        // Site links point at the page in the same language
        ReplacementRule::new(
            "](https://wiki-power.com/",
            [
                ("en", "](https://wiki-power.com/en/"),
                ("es", "](https://wiki-power.com/es/"),
                ("ar", "](https://wiki-power.com/ar/"),
            ],
        ),
    ]
}
