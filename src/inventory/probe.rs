use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::error::InventoryError;
use super::types::Candidate;

/// Asks a model executable to describe itself.
///
/// Implementations return the captured standard output and report failures
/// as [`InventoryError::ProbeFailed`]. Time limits are applied by the caller,
/// which drops the future on expiry.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, candidate: &Candidate) -> Result<String, InventoryError>;
}

/// Runs the executable as a child process with the introspection flag.
///
/// The child runs from the directory that holds it and is killed if the
/// probe future is dropped before it exits.
pub struct ProcessProber {
    flag: String,
}

impl ProcessProber {
    pub fn new(flag: impl Into<String>) -> Self {
        Self { flag: flag.into() }
    }
}

#[async_trait]
impl Prober for ProcessProber {
    async fn probe(&self, candidate: &Candidate) -> Result<String, InventoryError> {
        // Relative program paths are ambiguous once current_dir is set
        let program = candidate.path.canonicalize().unwrap_or_else(|_| candidate.path.clone());

        let mut cmd = Command::new(&program);
        cmd.arg(&self.flag)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = program.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        debug!(filename = %candidate.filename, flag = %self.flag, "Spawning model executable");

        let output = cmd.output().await.map_err(|e| InventoryError::ProbeFailed {
            filename: candidate.filename.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InventoryError::ProbeFailed {
                filename: candidate.filename.clone(),
                reason: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
