use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::InventoryError;
use super::types::ModelIndex;

/// Reads and writes the index artifact on disk.
///
/// The artifact is a cache: it is rewritten from scratch on every scan and
/// may be removed at shutdown.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the index as pretty JSON.
    ///
    /// The content goes to a sibling temp file first and is renamed into
    /// place, so readers never observe a half-written index.
    pub fn save(&self, index: &ModelIndex) -> Result<(), InventoryError> {
        let write_err = |reason: String| InventoryError::IndexWrite {
            path: self.path.clone(),
            reason,
        };

        let content = serde_json::to_string_pretty(index).map_err(|e| write_err(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content).map_err(|e| write_err(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| write_err(e.to_string()))?;

        debug!(
            path = %self.path.display(),
            root = index.root.len(),
            leaves = index.leaves.len(),
            details = index.details.len(),
            "Index saved"
        );
        Ok(())
    }

    /// Reads the stored index.
    pub fn load(&self) -> Result<ModelIndex, InventoryError> {
        let content = fs::read_to_string(&self.path).map_err(|source| InventoryError::IndexUnreadable {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| InventoryError::IndexUnparseable {
            path: self.path.clone(),
            source,
        })
    }

    /// Deletes the stored index. A missing file is not an error.
    pub fn remove(&self) -> Result<bool, InventoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed index file {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(InventoryError::IndexWrite {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
