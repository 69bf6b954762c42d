use crate::canonicalize_or_current;
use crate::commands::open_program_db;
use anyhow::{Context, Result};
use dwarfone_core::db::ProjectLayout;

/// List recorded import runs.
pub fn list_runs_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (_config, _db_path, db) = open_program_db(&layout)?;
    let runs = db.list_import_runs().context("Failed to list import runs")?;

    if json {
        let serialized =
            serde_json::to_string_pretty(&runs).context("Failed to serialize import runs to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Import runs ({}):", runs.len());
    if runs.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for run in runs {
        println!(
            "  - {} [{}] {} created={} renamed={} skipped={} failed={}",
            run.source,
            run.status.as_str(),
            run.finished_at,
            run.created,
            run.renamed,
            run.skipped,
            run.failed
        );
    }

    Ok(())
}
