use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::{Id, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::error::InventoryError;
use super::parse::{is_well_formed, parse_details};
use super::probe::Prober;
use super::scan::enumerate;
use super::store::IndexStore;
use super::types::{Candidate, ModelIndex, ScanSummary, ValidationResult};

/// Settings the builder needs, passed in at construction.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Extension of model executables, without the dot
    pub executable_extension: String,
    /// Argument passed to every executable when probing
    pub introspection_flag: String,
    /// Probe executables that belong to no tier as well
    pub probe_unprefixed: bool,
    /// Limit for a single probe
    pub probe_timeout: Duration,
    /// Limit for a whole batch of probes
    pub batch_timeout: Duration,
    /// Maximum number of probes running at once
    pub max_parallel: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            executable_extension: "exe".to_string(),
            introspection_flag: "--info".to_string(),
            probe_unprefixed: true,
            probe_timeout: Duration::from_secs(30),
            batch_timeout: Duration::from_secs(300),
            max_parallel: 4,
        }
    }
}

/// Result of one probe, tied back to the executable it came from.
struct ProbeOutcome {
    candidate: Candidate,
    result: Result<String, InventoryError>,
}

/// Builds the model index and validates model executables.
///
/// Probes run concurrently; their results are gathered by the calling task
/// alone, so the index is assembled in memory and written once. Scans are
/// serialized so two overlapping requests cannot interleave their writes.
pub struct InventoryBuilder {
    config: InventoryConfig,
    prober: Arc<dyn Prober>,
    store: IndexStore,
    scan_lock: Mutex<()>,
}

impl InventoryBuilder {
    pub fn new(config: InventoryConfig, prober: Arc<dyn Prober>, store: IndexStore) -> Self {
        Self {
            config,
            prober,
            store,
            scan_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Model executables currently present in `models_dir`.
    pub fn enumerate(&self, models_dir: &Path) -> Result<Vec<Candidate>, InventoryError> {
        enumerate(models_dir, &self.config.executable_extension)
    }

    /// Rebuilds the index from scratch and persists it.
    ///
    /// The tier lists are saved before any probe runs so consumers can show
    /// them right away. Executables that fail, time out, or answer with too
    /// few fields stay listed in their tier but get no details.
    ///
    /// # Errors
    ///
    /// Only [`InventoryError::DirectoryUnavailable`]; nothing is written in
    /// that case.
    pub async fn build_index(&self, models_dir: &Path) -> Result<ModelIndex, InventoryError> {
        self.build(models_dir).await.map(|(index, _)| index)
    }

    /// Rebuilds the index and reports what happened.
    pub async fn scan(&self, models_dir: &Path) -> Result<ScanSummary, InventoryError> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let (index, failed) = self.build(models_dir).await?;

        let summary = ScanSummary {
            root: index.root.len(),
            leaves: index.leaves.len(),
            described: index.described(),
            failed,
            started_at,
            elapsed_ms: clock.elapsed().as_millis() as u64,
        };
        info!(
            root = summary.root,
            leaves = summary.leaves,
            described = summary.described,
            failed = summary.failed.len(),
            elapsed_ms = summary.elapsed_ms,
            "Model scan complete"
        );
        Ok(summary)
    }

    async fn build(&self, models_dir: &Path) -> Result<(ModelIndex, Vec<String>), InventoryError> {
        let _guard = self.scan_lock.lock().await;

        info!("Scanning models directory {}", models_dir.display());
        let candidates = self.enumerate(models_dir)?;
        let mut index = ModelIndex::from_candidates(&candidates);

        if let Err(e) = self.store.save(&index) {
            error!("Failed to write initial index snapshot: {}", e);
        }

        let targets: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.tier.is_some() || self.config.probe_unprefixed)
            .collect();
        debug!(targets = targets.len(), "Probing model executables");

        let mut failed = Vec::new();
        for outcome in self.run_probes(targets).await {
            let ProbeOutcome { candidate, result } = outcome;
            match result {
                Ok(output) => match parse_details(&output) {
                    Ok(details) => {
                        debug!(identifier = %candidate.identifier, "Model described itself");
                        index.details.insert(candidate.identifier, details);
                    }
                    Err(segments) => {
                        let err = InventoryError::MalformedOutput {
                            filename: candidate.filename.clone(),
                            segments,
                        };
                        warn!(identifier = %candidate.identifier, "{}", err);
                        failed.push(candidate.identifier);
                    }
                },
                Err(e) => {
                    error!(identifier = %candidate.identifier, "{}", e);
                    failed.push(candidate.identifier);
                }
            }
        }
        failed.sort();

        if let Err(e) = self.store.save(&index) {
            error!("Failed to write model index: {}", e);
        }

        Ok((index, failed))
    }

    /// Checks that every executable answers the introspection flag with
    /// delimiter-separated output.
    ///
    /// Executables that fail to run or print no delimiter are listed by
    /// filename. An empty directory validates as good.
    pub async fn validate_executables(&self, models_dir: &Path) -> Result<ValidationResult, InventoryError> {
        let candidates = self.enumerate(models_dir)?;
        info!(candidates = candidates.len(), "Validating model executables");

        let mut invalid: Vec<String> = self.run_probes(candidates)
            .await
            .into_iter()
            .filter_map(|ProbeOutcome { candidate, result }| match result {
                Ok(output) if is_well_formed(&output) => None,
                Ok(_) => {
                    warn!(filename = %candidate.filename, "Executable output has no field delimiter");
                    Some(candidate.filename)
                }
                Err(e) => {
                    error!(filename = %candidate.filename, "{}", e);
                    Some(candidate.filename)
                }
            })
            .collect();

        if invalid.is_empty() {
            info!("All model executables are valid");
            return Ok(ValidationResult::Good);
        }

        invalid.sort();
        warn!(invalid = invalid.len(), "Found invalid model executables");
        Ok(ValidationResult::Error { invalid_executables: invalid })
    }

    /// Probes every candidate and waits for all of them.
    ///
    /// Each probe is bounded by `probe_timeout`; the wait as a whole by
    /// `batch_timeout`. Probes still pending when the batch limit hits are
    /// aborted (their processes are killed) and reported as timed out. A probe
    /// task that panics is reported as failed with the panic message.
    async fn run_probes(&self, candidates: Vec<Candidate>) -> Vec<ProbeOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let probe_timeout = self.config.probe_timeout;
        let mut pending: BTreeMap<String, Candidate> = BTreeMap::new();
        let mut task_files: HashMap<Id, String> = HashMap::new();
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let filename = candidate.filename.clone();
            pending.insert(filename.clone(), candidate.clone());
            let prober = Arc::clone(&self.prober);
            let semaphore = Arc::clone(&semaphore);

            let handle = tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => match timeout(probe_timeout, prober.probe(&candidate)).await {
                        Ok(result) => result,
                        Err(_) => Err(InventoryError::ProbeTimeout {
                            filename: candidate.filename.clone(),
                            seconds: probe_timeout.as_secs(),
                        }),
                    },
                    Err(e) => Err(InventoryError::ProbeFailed {
                        filename: candidate.filename.clone(),
                        reason: e.to_string(),
                    }),
                };
                ProbeOutcome { candidate, result }
            });
            task_files.insert(handle.id(), filename);
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        let deadline = tokio::time::sleep(self.config.batch_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok(outcome)) => {
                        pending.remove(&outcome.candidate.filename);
                        outcomes.push(outcome);
                    }
                    Some(Err(e)) => {
                        let candidate = task_files
                            .get(&e.id())
                            .and_then(|filename| pending.remove(filename));
                        match candidate {
                            Some(candidate) => {
                                error!(filename = %candidate.filename, "Probe task did not complete: {}", e);
                                outcomes.push(ProbeOutcome {
                                    result: Err(InventoryError::ProbeFailed {
                                        filename: candidate.filename.clone(),
                                        reason: e.to_string(),
                                    }),
                                    candidate,
                                });
                            }
                            None => error!("Probe task did not complete: {}", e),
                        }
                    }
                    None => break,
                },
                _ = &mut deadline => {
                    warn!(
                        pending = pending.len(),
                        "Probe batch exceeded {} seconds, aborting remaining probes",
                        self.config.batch_timeout.as_secs()
                    );
                    tasks.shutdown().await;
                    break;
                }
            }
        }

        // Whatever is left hit the batch limit
        let batch_secs = self.config.batch_timeout.as_secs();
        for (filename, candidate) in pending {
            outcomes.push(ProbeOutcome {
                candidate,
                result: Err(InventoryError::ProbeTimeout { filename, seconds: batch_secs }),
            });
        }

        outcomes
    }
}
