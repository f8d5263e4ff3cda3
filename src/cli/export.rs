use crate::core::ledger::Ledger;
use crate::core::model::Business;
use crate::store::BusinessRepository;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const COLLECTION_FILE: &str = "businesses.json";

/// Writes the whole collection, or one business when `business` is given, as
/// pretty-printed JSON. Returns the path written.
pub fn run(
    repo: &dyn BusinessRepository,
    business: Option<&str>,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let ledger = Ledger::new(repo.load());
    let (json, default_name) = match business {
        Some(key) => {
            let business = ledger
                .find(key)
                .with_context(|| format!("Business not found: {key}"))?;
            (
                serde_json::to_string_pretty(business)?,
                export_file_name(business),
            )
        }
        None => (
            serde_json::to_string_pretty(ledger.businesses())?,
            COLLECTION_FILE.to_string(),
        ),
    };

    let path = output.map_or_else(|| PathBuf::from(default_name), Path::to_path_buf);
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    info!("Exported to {}", path.display());
    println!("Exported to {}", path.display());
    Ok(path)
}

/// Business name with whitespace runs collapsed to `_`.
fn export_file_name(business: &Business) -> String {
    let stem = business.name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}.json")
}
