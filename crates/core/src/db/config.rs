use serde::{Deserialize, Serialize};

use crate::program::ProgramSettings;

/// Database location as stored in the project config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the program database file (typically relative to project root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Serializable configuration describing a dwarfone project.
///
/// This lives at `.dwarfone/project.json` in the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-friendly project name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format, not the program.
    pub config_version: String,
    /// Database configuration (path is typically relative to project root).
    pub db: DbConfig,
    /// Address space, byte order, and calling convention of the target.
    #[serde(default)]
    pub program: ProgramSettings,
}

impl ProjectConfig {
    /// Create a new project configuration using the given name and db path.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            program: ProgramSettings::default(),
        }
    }

    /// Builder-style helper to replace the program settings.
    pub fn with_program(mut self, program: ProgramSettings) -> Self {
        self.program = program;
        self
    }
}
