// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a run. Everything that concerns a single record is
/// absorbed during decoding instead; see `process::decode::SkipReason`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A configured input file is absent or cannot be opened.
    #[error("input `{file_id}` is missing or unreadable at {}: {source}", .path.display())]
    MissingInput {
        file_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row does not have the expected columns.
    #[error("input `{file_id}` has an unexpected header: expected {expected:?}, found {found:?}")]
    BadHeader {
        file_id: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The feed could not be read as tab-delimited text.
    #[error("input `{file_id}` could not be parsed: {source}")]
    Csv {
        file_id: String,
        #[source]
        source: csv::Error,
    },
}

impl IngestError {
    /// Identifier of the input artifact that failed.
    pub fn file_id(&self) -> &str {
        match self {
            IngestError::MissingInput { file_id, .. }
            | IngestError::BadHeader { file_id, .. }
            | IngestError::Csv { file_id, .. } => file_id,
        }
    }
}
