//! Paragraph-aligned chunking.
//!
//! Documents are split on blank lines and paragraphs are packed greedily into
//! chunks that stay under the model's input limit. A paragraph is never split,
//! so one longer than the limit becomes a chunk of its own. Joining the chunks
//! with [`PARAGRAPH_SEPARATOR`] gives back the input exactly.

/// Blank line between paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const SEPARATOR_LEN: usize = 2;

/// Split `text` into chunks of at most `max_len` characters.
///
/// Lengths are counted in `char`s. Empty input yields no chunks.
pub fn chunk(text: &str, max_len: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    // (chunk text, its length in chars)
    let mut current: Option<(String, usize)> = None;

    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        let paragraph_len = paragraph.chars().count();

        current = match current.take() {
            None => Some((paragraph.to_string(), paragraph_len)),
            Some((mut buf, len)) if len + SEPARATOR_LEN + paragraph_len <= max_len => {
                buf.push_str(PARAGRAPH_SEPARATOR);
                buf.push_str(paragraph);
                Some((buf, len + SEPARATOR_LEN + paragraph_len))
            }
            Some((buf, _)) => {
                chunks.push(buf);
                Some((paragraph.to_string(), paragraph_len))
            }
        };
    }

    if let Some((buf, _)) = current {
        chunks.push(buf);
    }

    chunks
}

/// Join chunks (or their translations) back into one document.
pub fn reassemble<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}
