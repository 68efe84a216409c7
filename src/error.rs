//! Error kinds raised by the load pipeline.
//!
//! Every variant knows the [`Stage`] that produced it so the orchestrator can
//! log failures with their context before handing them back to the caller.

use std::{fmt, path::PathBuf};

use thiserror::Error;

/// Pipeline stage a failure was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Transform,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Extract => "extract",
            Stage::Transform => "transform",
            Stage::Load => "load",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum EtlError {
    /// The source path does not resolve to a readable file.
    #[error("Source file {path:?} not found or not readable")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The source exists but has no header row to parse.
    #[error("Source file {path:?} is empty")]
    EmptySource { path: PathBuf },

    /// The source could not be parsed as delimited text.
    #[error("Source file {path:?} could not be parsed: {message}")]
    MalformedSource { path: PathBuf, message: String },

    #[error("Transform of '{table}' failed: {message}")]
    Transform { table: String, message: String },

    #[error("Loading '{target}' failed")]
    Load {
        target: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl EtlError {
    pub fn stage(&self) -> Stage {
        match self {
            EtlError::SourceNotFound { .. }
            | EtlError::EmptySource { .. }
            | EtlError::MalformedSource { .. } => Stage::Extract,
            EtlError::Transform { .. } => Stage::Transform,
            EtlError::Load { .. } => Stage::Load,
        }
    }

    pub(crate) fn transform(table: &str, message: impl Into<String>) -> Self {
        EtlError::Transform {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn load(target: &str, source: rusqlite::Error) -> Self {
        EtlError::Load {
            target: target.to_string(),
            source,
        }
    }
}
