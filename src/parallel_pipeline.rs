// THEORY:
// The batch layer applies one `Operation` to many image files at once. Each file is
// independent, so the work fans out over tokio's blocking thread pool; a semaphore
// caps how many files are in flight so memory stays proportional to the worker
// count rather than to the batch size.
//
// Results are gathered with `join_all`, which keeps them in input order no matter
// which file finishes first. A failure on one file is recorded against that file
// and never cancels the others.
//
// Output names are derived from the input's file stem only, so two inputs from
// different directories can map to the same output path. Names are claimed in input
// order before anything is spawned; a later input whose output is already claimed
// fails with `InvalidParameter` and is never processed.

use crate::config::AnalysisConfig;
use crate::core_modules::utils::image_helper::ImageStore;
use crate::error::{Result, VisionError};
use crate::pipeline::Operation;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// What one successfully processed file produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutput {
    pub output: PathBuf,
    pub red_fraction: Option<f64>,
}

/// The outcome for a single input file.
#[derive(Debug)]
pub struct BatchItem {
    pub source: PathBuf,
    pub result: Result<BatchOutput>,
}

/// Aggregate numbers over a finished batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    /// Mean red fraction over the successful redness results, if any.
    pub mean_red_fraction: Option<f64>,
}

pub struct BatchProcessor {
    input: ImageStore,
    output: ImageStore,
    output_extension: String,
    permits: Arc<Semaphore>,
    worker_count: usize,
}

impl BatchProcessor {
    pub fn new(config: &AnalysisConfig) -> Self {
        let worker_count = config.worker_count();
        Self {
            input: ImageStore::new(&config.assets_dir),
            output: ImageStore::new(config.output_dir()),
            output_extension: config.output_extension.clone(),
            permits: Arc::new(Semaphore::new(worker_count)),
            worker_count,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Runs `operation` over every source. The returned items line up with `sources`.
    pub async fn process(&self, sources: Vec<PathBuf>, operation: Operation) -> Vec<BatchItem> {
        info!(files = sources.len(), workers = self.worker_count, ?operation, "starting batch");

        let planned = self.claim_outputs(sources, operation);
        let tasks = planned.into_iter().map(|(source, name)| {
            let permits = Arc::clone(&self.permits);
            let input = self.input.clone();
            let output = self.output.clone();
            async move {
                let result = match name {
                    Err(e) => Err(e),
                    Ok(name) => match permits.acquire_owned().await {
                        Ok(permit) => {
                            let job_source = source.clone();
                            tokio::task::spawn_blocking(move || {
                                let _permit = permit;
                                Self::process_file(&input, &output, &job_source, &name, operation)
                            })
                            .await
                            .unwrap_or_else(|e| {
                                Err(VisionError::Worker {
                                    message: format!("task for {} failed: {e}", source.display()),
                                })
                            })
                        }
                        Err(_) => Err(VisionError::Worker {
                            message: "worker pool closed".to_string(),
                        }),
                    },
                };
                if let Err(e) = &result {
                    warn!(source = %source.display(), error = %e, "batch item failed");
                }
                BatchItem { source, result }
            }
        });

        join_all(tasks).await
    }

    /// Pairs each source with its output name, in input order. A source whose output
    /// path was already claimed by an earlier source gets an error instead.
    fn claim_outputs(
        &self,
        sources: Vec<PathBuf>,
        operation: Operation,
    ) -> Vec<(PathBuf, Result<String>)> {
        let mut claimed = HashSet::new();
        sources
            .into_iter()
            .map(|source| {
                let name = operation.output_name(&source, &self.output_extension);
                let target = self.output.resolve(&name);
                let name = if claimed.insert(target.clone()) {
                    Ok(name)
                } else {
                    Err(VisionError::invalid_parameter(format!(
                        "output {} is already claimed by an earlier input",
                        target.display()
                    )))
                };
                (source, name)
            })
            .collect()
    }

    fn process_file(
        input: &ImageStore,
        output: &ImageStore,
        source: &Path,
        name: &str,
        operation: Operation,
    ) -> Result<BatchOutput> {
        let buffer = input.load_image(source)?;
        let outcome = operation.apply(&buffer)?;
        let written = output.save_image(outcome.buffer(), name)?;
        Ok(BatchOutput {
            output: written,
            red_fraction: outcome.red_fraction(),
        })
    }
}

pub fn summarize(items: &[BatchItem]) -> BatchSummary {
    let fractions: Vec<f64> = items
        .iter()
        .filter_map(|item| item.result.as_ref().ok())
        .filter_map(|output| output.red_fraction)
        .collect();
    let failed = items.iter().filter(|item| item.result.is_err()).count();
    BatchSummary {
        processed: items.len() - failed,
        failed,
        mean_red_fraction: (!fractions.is_empty())
            .then(|| fractions.iter().sum::<f64>() / fractions.len() as f64),
    }
}
