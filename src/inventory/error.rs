use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or reading the model index.
///
/// Only [`InventoryError::DirectoryUnavailable`] aborts a scan. The probe
/// variants are recorded per executable and never reach the caller of
/// `build_index` or `validate_executables`.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Models directory unavailable at {}: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Probe of {filename} failed: {reason}")]
    ProbeFailed { filename: String, reason: String },

    #[error("Probe of {filename} timed out after {seconds} seconds")]
    ProbeTimeout { filename: String, seconds: u64 },

    #[error("Output of {filename} has {segments} usable segments, expected at least 5")]
    MalformedOutput { filename: String, segments: usize },

    #[error("Index file {} could not be read: {source}", path.display())]
    IndexUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Index file {} is not a valid index: {source}", path.display())]
    IndexUnparseable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Index file {} could not be written: {reason}", path.display())]
    IndexWrite { path: PathBuf, reason: String },
}
