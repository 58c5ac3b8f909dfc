//! YAML front matter handling.
//!
//! A document may start with a `---` fenced YAML block. The block is cut off
//! before the body is translated, selected keys are translated through a
//! constrained gateway call, and the block is put back in front of the
//! translated body. Only the lines of the translated keys change; booleans and
//! every other key keep their exact original text.

use crate::error::{PipelineError, PipelineResult};
use crate::gateway::{TextGenerator, TranslationGateway};
use crate::i18n::LanguageConfig;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

fn fence_re() -> &'static Regex {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    FENCE_RE.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\n(?:---|(.*?)\n---)[ \t]*(?:\n|\z)").expect("fence regex")
    })
}

/// Why a fenced block could not be used as front matter.
///
/// This is never fatal: the document is translated as if it had no front
/// matter.
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("front matter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter is not a mapping of string keys")]
    NotAMapping,

    #[error("unsupported value for front matter key '{0}'")]
    UnsupportedValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

/// A parsed front matter block.
#[derive(Debug, Clone)]
pub struct FrontMatter {
    raw: String,
    entries: Vec<(String, MetadataValue)>,
}

/// A document split into its front matter and the rest.
#[derive(Debug)]
pub struct Extracted<'a> {
    pub front_matter: FrontMatter,
    /// Everything after the closing fence, starting with the newline that
    /// ends the fence line so line-delimited markers right below it match.
    pub body: &'a str,
}

/// Split `document` into front matter and body.
///
/// Returns `Ok(None)` when the document does not start with a fenced block,
/// and `Err` when it does but the block is not a usable mapping.
pub fn extract(document: &str) -> Result<Option<Extracted<'_>>, FrontMatterError> {
    let Some(caps) = fence_re().captures(document) else {
        return Ok(None);
    };
    let Some(whole) = caps.get(0) else {
        return Ok(None);
    };
    let block = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

    let front_matter = FrontMatter::parse(block)?;
    let body_start = if whole.as_str().ends_with('\n') {
        whole.end() - 1
    } else {
        whole.end()
    };
    Ok(Some(Extracted {
        front_matter,
        body: &document[body_start..],
    }))
}

/// Put a front matter block back in front of a body, one blank line apart.
pub fn render(block: &str, body: &str) -> String {
    let body = body.trim_start_matches('\n');
    if block.is_empty() {
        format!("---\n---\n\n{}", body)
    } else {
        format!("---\n{}\n---\n\n{}", block, body)
    }
}

impl FrontMatter {
    pub fn parse(raw: &str) -> Result<Self, FrontMatterError> {
        // An empty block between the fences
        if raw.trim().is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                entries: Vec::new(),
            });
        }

        let mapping = match serde_yaml::from_str::<Value>(raw)? {
            Value::Mapping(mapping) => mapping,
            _ => return Err(FrontMatterError::NotAMapping),
        };

        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Value::String(key) = key else {
                return Err(FrontMatterError::NotAMapping);
            };
            let value = match value {
                Value::Bool(flag) => MetadataValue::Flag(flag),
                Value::Sequence(items) => {
                    let items = items
                        .into_iter()
                        .map(scalar_to_string)
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| FrontMatterError::UnsupportedValue(key.clone()))?;
                    MetadataValue::List(items)
                }
                other => MetadataValue::Text(
                    scalar_to_string(other)
                        .ok_or_else(|| FrontMatterError::UnsupportedValue(key.clone()))?,
                ),
            };
            entries.push((key, value));
        }

        Ok(Self {
            raw: raw.to_string(),
            entries,
        })
    }

    /// The block text between the fences.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn entries(&self) -> &[(String, MetadataValue)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The designated keys that hold text and so get translated. Flags and
    /// lists are never sent to the model.
    pub fn translatable_keys<'k>(&self, designated: &'k [String]) -> Vec<&'k str> {
        designated
            .iter()
            .filter(|key| matches!(self.get(key), Some(MetadataValue::Text(_))))
            .map(String::as_str)
            .collect()
    }

    /// Translate the designated keys and return the new block text.
    ///
    /// One constrained gateway call per key, in order. Without translatable
    /// keys the block comes back unchanged and nothing is called.
    pub async fn translate<G: TextGenerator>(
        &self,
        gateway: &TranslationGateway<G>,
        language: &LanguageConfig,
        designated: &[String],
    ) -> PipelineResult<String> {
        let mut block = self.raw.clone();

        for key in self.translatable_keys(designated) {
            let response = gateway.translate_header(&block, language, key).await?;
            let malformed = |reason| PipelineError::MalformedHeader {
                key: key.to_string(),
                language: language.name.to_string(),
                reason,
            };
            let value = read_translated_value(&response, key).map_err(malformed)?;

            block = match splice_value(&block, key, &value)
                .or_else(|| splice_flow_value(&block, key, &value))
            {
                Some(spliced) => spliced,
                None => {
                    debug!("Key '{}' not found in block text, re-emitting front matter", key);
                    reemit_with(&block, key, &value).map_err(malformed)?
                }
            };
        }

        Ok(block)
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Drop code fences and `---` lines a model tends to wrap its answer in.
fn strip_wrapping(response: &str) -> String {
    response
        .trim()
        .lines()
        .filter(|line| {
            let line = line.trim();
            line != "---" && !line.starts_with("```")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pull the translated value of `key` out of a header translation response.
fn read_translated_value(response: &str, key: &str) -> Result<String, String> {
    let cleaned = strip_wrapping(response);

    if let Ok(Value::Mapping(mapping)) = serde_yaml::from_str::<Value>(&cleaned) {
        return match mapping.get(key) {
            Some(value) => scalar_to_string(value.clone())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| format!("value of '{}' is not text", key)),
            None => Err(format!("'{}' missing from response", key)),
        };
    }

    // Not YAML as a whole, look for the key's own line
    let line_re = Regex::new(&format!(r"(?m)^\s*{}\s*:\s*(.+?)\s*$", regex::escape(key)))
        .map_err(|e| e.to_string())?;
    let caps = line_re
        .captures(&cleaned)
        .ok_or_else(|| format!("'{}' missing from response", key))?;
    let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

    Ok(unquote(raw).to_string())
}

fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

/// Replace the value of top-level `key` in `block`, keeping its quoting style
/// where possible. Continuation lines of a multi-line value are replaced too.
/// Returns `None` if the key has no line of its own.
fn splice_value(block: &str, key: &str, value: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#"(?m)^(["']?{}["']?:)[ \t]*([^\n]*)(?:\n[ \t]+[^\n]*)*"#,
        regex::escape(key)
    ))
    .ok()?;
    let caps = re.captures(block)?;
    let whole = caps.get(0)?;
    let prefix = caps.get(1)?.as_str();
    let first_line = caps.get(2).map(|m| m.as_str().trim_end()).unwrap_or_default();
    let multi_line = whole.as_str().contains('\n');

    let rendered = if multi_line || first_line.is_empty() {
        double_quoted(value)
    } else if first_line.starts_with('\'') {
        format!("'{}'", value.replace('\'', "''"))
    } else if first_line.starts_with('"') || !is_plain_safe(value) {
        double_quoted(value)
    } else {
        value.to_string()
    };

    let mut out = String::with_capacity(block.len() + value.len());
    out.push_str(&block[..whole.start()]);
    out.push_str(prefix);
    out.push(' ');
    out.push_str(&rendered);
    out.push_str(&block[whole.end()..]);
    Some(out)
}

/// Replace the value of `key` inside a flow mapping (`{title: x, draft: true}`),
/// leaving the braces and every other entry as written.
fn splice_flow_value(block: &str, key: &str, value: &str) -> Option<String> {
    let trimmed = block.trim();
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return None;
    }

    let re = Regex::new(&format!(
        r#"[{{,]\s*["']?{}["']?\s*:[ \t]*("(?:[^"\\]|\\.)*"|'(?:[^']|'')*'|[^,}}\n]*)"#,
        regex::escape(key)
    ))
    .ok()?;
    let old = re.captures(block)?.get(1)?;
    let old_text = old.as_str().trim_end();

    let rendered = if old_text.starts_with('\'') {
        format!("'{}'", value.replace('\'', "''"))
    } else if old_text.starts_with('"') || !is_flow_plain_safe(value) {
        double_quoted(value)
    } else {
        value.to_string()
    };

    let end = old.start() + old_text.len();
    let mut out = String::with_capacity(block.len() + value.len());
    out.push_str(&block[..old.start()]);
    out.push_str(&rendered);
    out.push_str(&block[end..]);
    Some(out)
}

/// Last resort when the key cannot be located in the text: serialize the
/// block again with only `key` replaced. Values of other keys are preserved,
/// their formatting may not be.
fn reemit_with(block: &str, key: &str, value: &str) -> Result<String, String> {
    let mut mapping: Mapping = serde_yaml::from_str(block).map_err(|e| e.to_string())?;
    mapping.insert(Value::String(key.to_string()), Value::String(value.to_string()));
    serde_yaml::to_string(&mapping)
        .map(|text| text.trim_end().to_string())
        .map_err(|e| e.to_string())
}

/// JSON strings are valid YAML double-quoted scalars.
fn double_quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// Plain-safe and free of flow indicators.
fn is_flow_plain_safe(value: &str) -> bool {
    is_plain_safe(value) && !value.contains([',', '{', '}', '[', ']'])
}

/// Whether `value` reads back as the same string when written unquoted.
fn is_plain_safe(value: &str) -> bool {
    !value.is_empty()
        && !value.contains('\n')
        && matches!(serde_yaml::from_str::<Value>(value), Ok(Value::String(ref s)) if s == value)
}
