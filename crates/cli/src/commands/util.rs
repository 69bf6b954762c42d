use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use dwarfone_core::db::{ProgramDb, ProjectConfig, ProjectLayout};
use dwarfone_core::dwarf::DebugEntryTree;

/// Resolve the DB path (respecting relative/absolute config) and open a
/// ProgramDb (delegates to core helper).
pub fn open_program_db(layout: &ProjectLayout) -> Result<(ProjectConfig, PathBuf, ProgramDb)> {
    dwarfone_core::db::open_program_db(layout)
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Load an entry dump, picking the format from the file extension.
pub fn load_entry_tree(path: &Path) -> Result<DebugEntryTree> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entry dump {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let tree = match ext {
        "json" => DebugEntryTree::from_json_str(&body),
        "yaml" | "yml" => DebugEntryTree::from_yaml_str(&body),
        other => {
            return Err(anyhow!(
                "Unsupported entry dump extension '{other}' (expected json, yaml, or yml)"
            ))
        }
    };
    tree.with_context(|| format!("Failed to load entry dump {}", path.display()))
}
