use std::fs;

use crate::commands::open_program_db;
use crate::{canonicalize_or_current, infer_project_name};
use anyhow::{anyhow, Context, Result};
use dwarfone_core::db::{
    ImportRunRecord, MemoryBlockRecord, ProgramDb, ProjectConfig, ProjectLayout,
};
use dwarfone_core::program::ProgramSettings;
use dwarfone_core::types::Endianness;
use serde::Serialize;

#[derive(Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub program: ProgramSettings,
    pub meta_dir: String,
    pub memory_blocks: Vec<MemoryBlockRecord>,
    pub function_count: usize,
    pub import_runs: Vec<ImportRunRecord>,
}

/// Initialize a new project at `root`.
pub fn init_project_command(
    root: &str,
    name: Option<String>,
    address_size: u8,
    big_endian: bool,
) -> Result<()> {
    if !(8..=64).contains(&address_size) {
        return Err(anyhow!("Address size must be between 8 and 64 bits, got {address_size}"));
    }

    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    // Derive project name if not provided.
    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;

    let program = ProgramSettings {
        address_size_bits: address_size,
        endianness: if big_endian { Endianness::Big } else { Endianness::Little },
        ..ProgramSettings::default()
    };
    let config = ProjectConfig::new(&project_name, layout.db_path_relative_string())
        .with_program(program.clone());

    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    // Create the program database immediately so follow-on commands (and tests)
    // can rely on its presence.
    ProgramDb::open(&layout.db_path, program).with_context(|| {
        format!("Failed to initialize program database at {}", layout.db_path.display())
    })?;

    println!("Initialized dwarfone project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!(
        "  Target: {}-bit, {:?} endian",
        config.program.address_size_bits, config.program.endianness
    );

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (config, _db_path, db) = open_program_db(&layout)?;
    let memory_blocks = db.list_memory_blocks().context("Failed to list memory blocks")?;
    let function_count = db.list_functions().context("Failed to list functions")?.len();
    let import_runs = db.list_import_runs().context("Failed to list import runs")?;

    if json {
        let snapshot = ProjectInfoSnapshot {
            name: config.name.clone(),
            root: layout.root.display().to_string(),
            config_file: layout.project_config_path.display().to_string(),
            config_version: config.config_version.clone(),
            db_path: config.db.path.clone(),
            program: config.program.clone(),
            meta_dir: layout.meta_dir.display().to_string(),
            memory_blocks,
            function_count,
            import_runs,
        };
        let serialized = serde_json::to_string_pretty(&snapshot)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("dwarfone Project Info");
    println!("=====================");
    println!("Name: {}", config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.project_config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.db.path);
    println!(
        "Target: {}-bit, {:?} endian, calling convention {}",
        config.program.address_size_bits,
        config.program.endianness,
        config.program.calling_convention.name
    );
    println!();

    println!("Directories:");
    crate::commands::print_dir_status("Meta dir (.dwarfone)", &layout.meta_dir);
    println!();

    println!("Memory blocks: {}", memory_blocks.len());
    for block in &memory_blocks {
        println!("- {} [{:#x}, {:#x})", block.name, block.start, block.end);
    }
    println!("Functions: {}", function_count);
    println!("Import runs: {}", import_runs.len());

    Ok(())
}
