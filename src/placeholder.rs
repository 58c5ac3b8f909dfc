//! Placeholder substitution for fixed text spans.
//!
//! Some literals (copyright lines, site links) have a hand-written translation
//! per language. Before the body goes to the model each literal is swapped for
//! a token, and after generation the token is swapped for the language's
//! replacement, so the model never gets a chance to rephrase it.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A literal and its hand-written counterpart per language code.
#[derive(Debug, Clone)]
pub struct ReplacementRule {
    pub original: String,
    pub replacements: HashMap<&'static str, String>,
}

impl ReplacementRule {
    pub fn new<I, S>(original: impl Into<String>, replacements: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, S)>,
        S: Into<String>,
    {
        Self {
            original: original.into(),
            replacements: replacements
                .into_iter()
                .map(|(code, text)| (code, text.into()))
                .collect(),
        }
    }

    /// Replacement for `language`, or the original literal if the rule has
    /// none for that language.
    pub fn replacement_for(&self, language: &str) -> &str {
        self.replacements
            .get(language)
            .map(String::as_str)
            .unwrap_or(&self.original)
    }
}

/// Token standing in for rule `index` (0-based). The closing bracket keeps
/// `[1]` from being a prefix of `[10]`.
pub fn token_for(index: usize) -> String {
    format!("to_be_replace[{}]", index + 1)
}

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| Regex::new(r"to_be_replace\[\d+\]").expect("token regex"))
}

/// Text with literals swapped for tokens, plus what each token turns into.
#[derive(Debug, Clone, Default)]
pub struct Protected {
    pub text: String,
    pub restorations: Vec<(String, String)>,
}

/// Swap every occurrence of each rule's literal for its token, in rule order.
pub fn protect(text: &str, rules: &[ReplacementRule], language: &str) -> Protected {
    let mut text = text.to_string();
    let mut restorations = Vec::with_capacity(rules.len());

    for (index, rule) in rules.iter().enumerate() {
        let token = token_for(index);
        if !rule.original.is_empty() && text.contains(&rule.original) {
            text = text.replace(&rule.original, &token);
        }
        restorations.push((token, rule.replacement_for(language).to_string()));
    }

    Protected { text, restorations }
}

/// Swap every token back for its recorded replacement.
pub fn restore(text: &str, restorations: &[(String, String)]) -> String {
    restorations
        .iter()
        .fold(text.to_string(), |acc, (token, replacement)| {
            if acc.contains(token.as_str()) {
                acc.replace(token.as_str(), replacement)
            } else {
                acc
            }
        })
}

/// Tokens still present in `text`.
pub fn leaked_tokens(text: &str) -> Vec<String> {
    token_re()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
