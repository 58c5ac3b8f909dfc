//! Processed-file ledger.
//!
//! A plain text file with one filename per line. A filename is appended after
//! its first successful translation and never removed. Lookups match whole
//! lines exactly, so `post.md` is not mistaken for `old-post.md`.
//!
//! There is no file locking: two runs against the same ledger at once are not
//! supported.

use crate::error::{PipelineError, PipelineResult};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: HashSet<String>,
    /// The file is non-empty and does not end with a newline
    needs_newline: bool,
}

impl Ledger {
    /// Load the ledger, creating an empty file if there is none.
    pub fn open(path: impl Into<PathBuf>) -> PipelineResult<Self> {
        let path = path.into();
        if !path.exists() {
            fs::write(&path, "").map_err(|e| PipelineError::write(&path, e))?;
            info!("Ledger created: {}", path.display());
        }
        Self::load(path)
    }

    /// Load the ledger without creating it. A missing file reads as empty.
    pub fn load(path: impl Into<PathBuf>) -> PipelineResult<Self> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(PipelineError::read(&path, e)),
        };

        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            needs_newline: !content.is_empty() && !content.ends_with('\n'),
            path,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.contains(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `filename` unless it is already recorded. Returns whether a
    /// line was written.
    pub fn record(&mut self, filename: &str) -> PipelineResult<bool> {
        if self.contains(filename) {
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::write(&self.path, e))?;

        let line = if self.needs_newline {
            format!("\n{}\n", filename)
        } else {
            format!("{}\n", filename)
        };
        file.write_all(line.as_bytes())
            .map_err(|e| PipelineError::write(&self.path, e))?;

        self.needs_newline = false;
        self.entries.insert(filename.to_string());
        info!("Added into ledger: {}", filename);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_list.txt");

        let ledger = Ledger::open(&path).expect("Should open");

        assert!(path.exists());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_load_missing_file_does_not_create_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_list.txt");

        let ledger = Ledger::load(&path).expect("Should load");

        assert!(!path.exists());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_reads_legacy_format_with_leading_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_list.txt");
        fs::write(&path, "\na.md\nb.md").unwrap();

        let ledger = Ledger::open(&path).expect("Should open");

        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains("a.md"));
        assert!(ledger.contains("b.md"));
    }

    #[test]
    fn test_membership_is_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_list.txt");
        fs::write(&path, "old-post.md\n").unwrap();

        let ledger = Ledger::open(&path).expect("Should open");

        assert!(ledger.contains("old-post.md"));
        assert!(!ledger.contains("post.md"));
        assert!(!ledger.contains("old-post"));
    }

    #[test]
    fn test_record_appends_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_list.txt");
        let mut ledger = Ledger::open(&path).expect("Should open");

        assert!(ledger.record("a.md").expect("write"));
        assert!(!ledger.record("a.md").expect("write"));
        assert!(ledger.record("b.md").expect("write"));

        assert_eq!(fs::read_to_string(&path).unwrap(), "a.md\nb.md\n");
    }

    #[test]
    fn test_record_after_unterminated_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed_list.txt");
        fs::write(&path, "\na.md").unwrap();
        let mut ledger = Ledger::open(&path).expect("Should open");

        ledger.record("b.md").expect("write");

        assert_eq!(fs::read_to_string(&path).unwrap(), "\na.md\nb.md\n");
        let reloaded = Ledger::load(&path).expect("reload");
        assert!(reloaded.contains("a.md") && reloaded.contains("b.md"));
    }
}
