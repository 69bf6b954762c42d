use std::fs;

use dwarfone_core::db::{open_program_db, ProjectConfig, ProjectContext, ProjectLayout};
use dwarfone_core::program::ProgramSettings;
use dwarfone_core::types::Endianness;
use tempfile::tempdir;

#[test]
fn layout_paths_live_under_meta_dir() {
    let layout = ProjectLayout::new("/tmp/proj");
    assert!(layout.meta_dir.ends_with(".dwarfone"));
    assert!(layout.project_config_path.ends_with(".dwarfone/project.json"));
    assert!(layout.db_path.ends_with(".dwarfone/program.db"));
    assert_eq!(
        layout.db_path_relative_string(),
        ".dwarfone/program.db".replace('/', std::path::MAIN_SEPARATOR_STR)
    );
}

#[test]
fn context_opens_db_with_project_settings() {
    let tmp = tempdir().expect("tempdir");
    let layout = ProjectLayout::new(tmp.path());
    fs::create_dir_all(&layout.meta_dir).expect("create meta dir");

    let program = ProgramSettings {
        address_size_bits: 64,
        endianness: Endianness::Big,
        ..ProgramSettings::default()
    };
    let config = ProjectConfig::new("ps2-game", layout.db_path_relative_string())
        .with_program(program.clone());
    let json = serde_json::to_string_pretty(&config).expect("serialize");
    fs::write(&layout.project_config_path, json).expect("write config");

    let ctx = ProjectContext::from_root(tmp.path()).expect("context");
    assert_eq!(ctx.config.name, "ps2-game");
    assert_eq!(ctx.db.settings(), &program);
    assert_eq!(ctx.db_path, layout.db_path);
    assert!(ctx.db_path.exists());
}

#[test]
fn config_without_program_section_uses_defaults() {
    let tmp = tempdir().expect("tempdir");
    let layout = ProjectLayout::new(tmp.path());
    fs::create_dir_all(&layout.meta_dir).expect("create meta dir");
    fs::write(
        &layout.project_config_path,
        r#"{"name":"old","description":null,"config_version":"0.1.0","db":{"path":".dwarfone/program.db"}}"#,
    )
    .expect("write config");

    let (config, _, db) = open_program_db(&layout).expect("open");
    assert_eq!(config.program, ProgramSettings::default());
    assert_eq!(db.settings().address_size_bits, 32);
}

#[test]
fn missing_config_is_an_error() {
    let tmp = tempdir().expect("tempdir");
    let err = ProjectContext::from_root(tmp.path()).expect_err("no config");
    assert!(format!("{err:#}").contains("Failed to read project config"));
}
