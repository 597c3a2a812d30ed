//! Error Taxonomy
//!
//! Two surfaces, two enums: `ArtifactError` for everything that can go
//! wrong while loading the exported model artifacts, `ScoringError` for
//! request-time failures. Data-quality degradations (bad dates, unknown
//! categories) are NOT errors; they are counted by the telemetry and the
//! record is still scored.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or validating the exported model artifacts.
///
/// Every variant names the offending file so operators can tell a
/// missing export from a corrupted one.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A required artifact file is absent from the model directory
    #[error("missing artifact file: {}", .path.display())]
    Missing { path: PathBuf },

    /// The artifact file exists but could not be read
    #[error("failed to read artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact file was read but is not a valid export
    #[error("failed to parse artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifacts were loaded individually but disagree with each other
    #[error("inconsistent artifacts: {0}")]
    Inconsistent(String),
}

impl ArtifactError {
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::Inconsistent(msg.into())
    }
}

/// Request-time failures surfaced to callers of the scoring pipeline.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// No artifact snapshot is published; nothing can be scored
    #[error("models unavailable: no artifact snapshot is loaded")]
    ModelsUnavailable,

    /// A snapshot exists but its feature schema is empty
    #[error("schema unavailable: artifact bundle carries no feature columns")]
    SchemaUnavailable,

    /// Bulk input rejected as a whole before scoring any row
    #[error("missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    /// The delimited input itself is untypeable below the row level
    #[error("failed to read delimited input: {0}")]
    Csv(#[from] csv::Error),
}
