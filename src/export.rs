//! Batch export.
//!
//! Successful products are written as one JSON array, each object
//! augmented with a zero-based positional `id`. Failed slots are excluded
//! from the file and logged with their input identifier, so the export is
//! always a clean list of valid records.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::reconcile::DocumentOutcome;

/// Write batch outcomes to `out_path`, creating parent directories as
/// needed. Returns the number of products written.
pub fn export_products(outcomes: &[DocumentOutcome], out_path: &Path) -> Result<usize> {
    let mut payload: Vec<Value> = Vec::new();
    for outcome in outcomes {
        match outcome {
            DocumentOutcome::Produced(product) => {
                let mut value = serde_json::to_value(product)
                    .map_err(|e| Error::ExportError(e.to_string()))?;
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("id".to_string(), Value::from(payload.len() as u64));
                }
                payload.push(value);
            }
            DocumentOutcome::Failed { path, message } => {
                warn!(
                    "excluding failed document {} from export: {message}",
                    path.display()
                );
            }
        }
    }

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::ExportError(format!("creating {}: {e}", parent.display()))
            })?;
        }
    }

    let json =
        serde_json::to_string_pretty(&payload).map_err(|e| Error::ExportError(e.to_string()))?;
    fs::write(out_path, json)
        .map_err(|e| Error::ExportError(format!("writing {}: {e}", out_path.display())))?;

    info!("exported {} products to {}", payload.len(), out_path.display());
    Ok(payload.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use std::path::PathBuf;

    fn named_product(name: &str) -> Product {
        Product {
            name: name.to_string(),
            ..Product::unknown()
        }
    }

    #[test]
    fn test_export_assigns_positional_ids() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("products.json");
        let outcomes = vec![
            DocumentOutcome::Produced(named_product("First")),
            DocumentOutcome::Produced(named_product("Second")),
        ];

        let written = export_products(&outcomes, &out).unwrap();
        assert_eq!(written, 2);

        let parsed: Vec<Value> = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed[0]["id"], 0);
        assert_eq!(parsed[0]["name"], "First");
        assert_eq!(parsed[1]["id"], 1);
        assert_eq!(parsed[1]["name"], "Second");
    }

    #[test]
    fn test_export_excludes_failures_without_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("products.json");
        let outcomes = vec![
            DocumentOutcome::Produced(named_product("First")),
            DocumentOutcome::Failed {
                path: PathBuf::from("bad.html"),
                message: "panicked".to_string(),
            },
            DocumentOutcome::Produced(named_product("Third")),
        ];

        export_products(&outcomes, &out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        // ids stay contiguous across the excluded slot
        assert_eq!(parsed[1]["id"], 1);
        assert_eq!(parsed[1]["name"], "Third");
    }

    #[test]
    fn test_export_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/output/products.json");

        let written = export_products(&[], &out).unwrap();

        assert_eq!(written, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "[]");
    }

    #[test]
    fn test_exported_product_keeps_schema_fields() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("products.json");
        let outcomes = vec![DocumentOutcome::Produced(Product::unknown())];

        export_products(&outcomes, &out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let record = parsed[0].as_object().unwrap();
        assert_eq!(record["name"], "Unknown Product");
        assert_eq!(record["price"]["price"], 0.0);
        assert_eq!(record["category"]["name"], "Uncategorized");
        assert!(record.contains_key("variants"));
    }
}
