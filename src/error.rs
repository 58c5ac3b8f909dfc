use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a translation run.
///
/// Every variant is fatal: the run controller stops at the first one and the
/// binary exits non-zero. Per-document recoverable conditions (a front matter
/// block that does not parse) are [`crate::front_matter::FrontMatterError`]
/// and never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("text generation failed while translating into {language}")]
    Generation {
        language: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("unusable front matter translation for key '{key}' ({language}): {reason}")]
    MalformedHeader {
        key: String,
        language: String,
        reason: String,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
