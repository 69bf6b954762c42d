use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use dwarfone_core::db::{ImportRunRecord, ImportRunStatus, ProjectLayout};
use dwarfone_core::diagnostics::MessageLog;
use dwarfone_core::import::import_functions;
use dwarfone_core::types::DwarfTypeManager;
use tracing::info;

use crate::commands::{load_entry_tree, open_program_db};
use crate::{canonicalize_or_current, sha256_file};

/// Import every subroutine of an entry dump and record the run.
pub fn import_command(root: &str, entries: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let (_config, _db_path, mut db) = open_program_db(&layout)?;

    let entries_path = Path::new(entries);
    let entries_path = if entries_path.is_absolute() {
        entries_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(entries_path)
    };

    let started_at = Utc::now().to_rfc3339();
    let tree = load_entry_tree(&entries_path)?;
    let source_hash = sha256_file(&entries_path)?;

    let types = DwarfTypeManager::new(&tree, db.settings().endianness);
    let registered = types.register_user_types();
    info!(entries = tree.len(), registered, "loaded entry dump");

    let mut log = MessageLog::new();
    let summary = import_functions(&tree, &mut db, &types, &mut log);
    let finished_at = Utc::now().to_rfc3339();

    let status =
        if summary.failed > 0 { ImportRunStatus::Partial } else { ImportRunStatus::Succeeded };
    let record = ImportRunRecord {
        source: entries.to_string(),
        source_hash: Some(source_hash),
        status,
        started_at,
        finished_at,
        created: summary.created,
        renamed: summary.renamed,
        skipped: summary.skipped,
        failed: summary.failed,
    };
    db.insert_import_run(&record)?;

    println!("Imported {}:", entries);
    println!("  Created: {}", summary.created);
    println!("  Renamed: {}", summary.renamed);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed:  {}", summary.failed);
    println!("  Status:  {}", status.as_str());
    if !log.is_empty() {
        println!("Messages:");
        for message in log.messages() {
            println!("  {}", message);
        }
    }

    Ok(())
}
