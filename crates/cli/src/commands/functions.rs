use crate::canonicalize_or_current;
use crate::commands::open_program_db;
use anyhow::{Context, Result};
use dwarfone_core::db::ProjectLayout;

/// List all functions in the program database.
pub fn list_functions_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (_config, _db_path, db) = open_program_db(&layout)?;
    let functions = db.list_functions().context("Failed to list functions")?;

    if json {
        let serialized = serde_json::to_string_pretty(&functions)
            .context("Failed to serialize functions to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Functions ({}):", functions.len());
    if functions.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for func in functions {
        let params = func
            .params
            .iter()
            .map(|p| match &p.name {
                Some(name) => format!("{} {}", p.data_type, name),
                None => p.data_type.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let ret = func.return_type.as_deref().unwrap_or("undefined");
        println!(
            "  - {} {} {}({}) [{}]",
            func.entry,
            ret,
            func.name,
            params,
            func.name_source.as_str()
        );
    }

    Ok(())
}
