//! Reconciliation orchestration.
//!
//! One pipeline run turns one HTML document into one final [`Product`].
//! The DOM work (signals, candidates, distillation) happens synchronously
//! up front while the dimension probes already run in their own task, so a
//! document's CPU work overlaps its own network latency. Any internal
//! failure maps to the sentinel product; the batch driver additionally
//! captures task panics as per-slot failure markers, so every input
//! document always reports exactly one outcome.

pub mod llm;
pub mod prompt;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::distill;
use crate::error::{Error, Result};
use crate::images::{collect_image_urls, ImageProber};
use crate::metadata;
use crate::options::Options;
use crate::product::Product;
use crate::truth_sheet::{build_truth_sheet, upgrade_variant_images};
use crate::url_utils::path_is_blocked;

pub use llm::{OpenRouterClient, Reasoner, DEFAULT_MODEL};
pub use prompt::assemble_prompt;

/// Per-document result of a batch run.
///
/// `Failed` marks a task that did not complete at all (a panic inside the
/// document task); it is distinct from a sentinel product, which is a
/// completed run that could not produce a valid record.
#[derive(Debug, PartialEq)]
pub enum DocumentOutcome {
    Produced(Product),
    Failed { path: PathBuf, message: String },
}

impl DocumentOutcome {
    /// The product, when the document task completed.
    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Produced(product) => Some(product),
            Self::Failed { .. } => None,
        }
    }
}

/// Drives extraction, image verification, and the reconciliation call.
#[derive(Clone)]
pub struct Pipeline {
    reasoner: Arc<dyn Reasoner>,
    prober: ImageProber,
    opts: Options,
}

impl Pipeline {
    pub fn new(reasoner: Arc<dyn Reasoner>, opts: Options) -> Result<Self> {
        let prober = ImageProber::new(&opts)?;
        Ok(Self {
            reasoner,
            prober,
            opts,
        })
    }

    /// Produce the final product for one document.
    ///
    /// Never fails: any internal error is logged and replaced by the
    /// sentinel product.
    pub async fn run(&self, path: &Path) -> Product {
        match self.try_run(path).await {
            Ok(product) => product,
            Err(e) => {
                warn!("pipeline failed for {}: {e}", path.display());
                Product::unknown()
            }
        }
    }

    async fn try_run(&self, path: &Path) -> Result<Product> {
        // The document handle is not Send; it is scoped to this block so it
        // is gone before the first await.
        let (candidates, probe_task, signals, markdown) = {
            let doc = metadata::load_document(path)?;

            let candidates: Vec<String> = collect_image_urls(&doc, self.opts.base_url.as_deref())
                .into_iter()
                .filter(|url| !path_is_blocked(url, &self.opts))
                .collect();

            // Probes run concurrently with the rest of the document's DOM work.
            let prober = self.prober.clone();
            let probe_candidates = candidates.clone();
            let probe_task = tokio::spawn(async move { prober.verify(probe_candidates).await });

            let signals = metadata::collect_signals(&doc, &self.opts);
            let markdown = distill::distill_document(&doc, &self.opts);
            (candidates, probe_task, signals, markdown)
        };

        let mut sheet = build_truth_sheet(&signals, &self.opts);
        upgrade_variant_images(&mut sheet, &candidates, &self.opts);

        let verified = probe_task
            .await
            .map_err(|e| Error::ClientError(format!("image probe task failed: {e}")))?;
        debug!(
            "{}: {} candidates, {} verified",
            path.display(),
            candidates.len(),
            verified.len()
        );

        let prompt = assemble_prompt(&sheet, &markdown, &signals.json_ld, &verified, &candidates);
        let mut product = self.reasoner.reconcile(&prompt).await?;

        if product.image_urls.is_empty() {
            if let Some(first) = sheet.image_urls.first() {
                product.image_urls.push(first.clone());
            }
        }
        product.normalize(&self.opts);
        Ok(product)
    }

    /// Run one document task per input path concurrently and collect
    /// outcomes in input order.
    pub async fn run_batch(&self, paths: &[PathBuf]) -> Vec<DocumentOutcome> {
        let mut handles = Vec::with_capacity(paths.len());
        for path in paths {
            let pipeline = self.clone();
            let path = path.clone();
            handles.push(tokio::spawn(async move { pipeline.run(&path).await }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (handle, path) in handles.into_iter().zip(paths) {
            match handle.await {
                Ok(product) => outcomes.push(DocumentOutcome::Produced(product)),
                Err(e) => {
                    error!("document task failed for {}: {e}", path.display());
                    outcomes.push(DocumentOutcome::Failed {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
        outcomes
    }
}
