use crate::commands::open_program_db;
use crate::{canonicalize_or_current, parse_address};
use anyhow::{Context, Result};
use dwarfone_core::db::{MemoryBlockRecord, ProjectLayout};

/// Add a memory block to the program database.
pub fn add_block_command(root: &str, name: &str, start: &str, end: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (_config, db_path, db) = open_program_db(&layout)?;

    let record = MemoryBlockRecord::new(name, parse_address(start)?, parse_address(end)?);
    let id = db
        .add_memory_block(&record)
        .with_context(|| format!("Failed to add memory block '{name}'"))?;

    println!("Added memory block:");
    println!("  Id: {}", id);
    println!("  Name: {}", record.name);
    println!("  Range: [{:#x}, {:#x})", record.start, record.end);
    println!("  DB: {}", db_path.display());

    Ok(())
}
