//! Contact commands: list, clean.
//!
//! CHANGELOG:
//! - 02/18/2026 - clean writes the normalized members CSV
//! - 02/14/2026 - Initial implementation

use crate::config::{expand_path, Config};
use crate::contacts::{sheet, ContactStore, ImportSummary, Sheet};
use crate::output::OutputControls;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;

/// Load a sheet into a fresh store and run the standing cleanup.
pub fn load_store(input: &str) -> Result<(ContactStore, ImportSummary)> {
    let path = expand_path(input);
    let sheet = Sheet::from_path(&path)
        .with_context(|| format!("Failed to read contact sheet: {:?}", path))?;

    let mut store = ContactStore::new();
    let summary = store
        .import_bulk(&sheet)
        .with_context(|| format!("Failed to import {:?}", path))?;
    store.dedup_keep_last();
    Ok((store, summary))
}

/// List members, optionally filtered.
pub fn list(input: &str, search: Option<&str>, output: &OutputControls) -> Result<()> {
    let (store, _) = load_store(input)?;
    let matches = store.search(search.unwrap_or(""));

    if output.json {
        output.print(&matches);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No members found.");
        return Ok(());
    }

    println!("Members ({}):", matches.len());
    println!("{}", "-".repeat(50));
    for member in matches {
        println!("{}: {} ({})", member.id, member.name, member.phone);
    }

    Ok(())
}

/// Normalize and dedup a sheet, then write the members CSV.
pub fn clean(input: &str, output_path: Option<&str>, config: &Config, output: &OutputControls) -> Result<()> {
    let (store, summary) = load_store(input)?;

    let target: PathBuf = match output_path {
        Some(p) => expand_path(p),
        None => config.export_path(),
    };
    sheet::export_csv(&store, &target)
        .with_context(|| format!("Failed to write members CSV: {:?}", target))?;

    if output.json {
        output.print(&json!({
            "success": true,
            "output": target.display().to_string(),
            "members": store.len(),
            "duplicates": summary.duplicates,
            "skipped": summary.skipped,
        }));
    } else {
        println!(
            "Wrote {} members to {} ({} duplicates dropped, {} rows skipped)",
            store.len(),
            target.display(),
            summary.duplicates,
            summary.skipped
        );
    }

    Ok(())
}
