//! Batch runner: reconciles every saved product page in a directory and
//! optionally exports the results as a JSON array.

use rs_prodsheet::reconcile::DEFAULT_MODEL;
use rs_prodsheet::{export_products, DocumentOutcome, OpenRouterClient, Options, Pipeline};
use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn collect_html_files(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        if path.is_file() && (ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut input_dir = PathBuf::from("data");
    let mut export_path: Option<PathBuf> = None;
    let mut model = DEFAULT_MODEL.to_string();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--export" => {
                export_path = Some(PathBuf::from(
                    args.next().ok_or("--export requires a file path")?,
                ));
            }
            "--model" => {
                model = args.next().ok_or("--model requires a model name")?;
            }
            other => input_dir = PathBuf::from(other),
        }
    }

    if !input_dir.exists() {
        return Err(format!("Input dir does not exist: {}", input_dir.display()).into());
    }

    let files = collect_html_files(&input_dir)?;
    if files.is_empty() {
        return Err(format!("No HTML files found in {}", input_dir.display()).into());
    }
    info!(count = files.len(), dir = %input_dir.display(), "starting batch");

    let reasoner = Arc::new(OpenRouterClient::new(model)?);
    let pipeline = Pipeline::new(reasoner, Options::default())?;
    let outcomes = pipeline.run_batch(&files).await;

    let mut produced = 0usize;
    for (path, outcome) in files.iter().zip(&outcomes) {
        match outcome {
            DocumentOutcome::Produced(product) => {
                produced += 1;
                info!(path = %path.display(), name = %product.name, "reconciled");
            }
            DocumentOutcome::Failed { message, .. } => {
                error!(path = %path.display(), message = %message, "pipeline failed");
            }
        }
    }
    info!(
        produced,
        failed = outcomes.len() - produced,
        "batch finished"
    );

    if let Some(out_path) = export_path {
        let written = export_products(&outcomes, &out_path)?;
        info!(written, path = %out_path.display(), "export complete");
    }

    Ok(())
}
