use std::path::Path;

use anyhow::{Context, Result};
use stitch_counter_store::JsonStore;

pub fn run_export(store: &JsonStore, path: &Path) -> Result<()> {
    let metadata = store
        .export_library(path)
        .with_context(|| format!("failed to export library to {}", path.display()))?;
    println!(
        "Exported {} project(s) to {}",
        metadata.project_count,
        path.display()
    );
    Ok(())
}

pub fn run_import(store: &JsonStore, path: &Path, replace_existing: bool) -> Result<()> {
    let summary = store
        .import_library(path, replace_existing)
        .with_context(|| format!("failed to import library from {}", path.display()))?;
    println!(
        "Imported {} project(s) from {}",
        summary.imported.len(),
        path.display()
    );
    Ok(())
}
