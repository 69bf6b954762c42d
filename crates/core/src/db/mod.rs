//! Project database integration and project layout definitions.
//!
//! This module wraps a SQLite database storing:
//! - Memory blocks (the program's valid address set)
//! - Functions, their bodies, and their signatures
//! - Import run histories
//!
//! It also defines:
//! - `ProjectConfig`: serializable project metadata, including the program settings.
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProgramDb`: the SQLite-backed `ProgramModel` implementation.
//! - `ProjectContext`: layout + config + open database bundled together.

pub mod config;
pub mod context;
pub mod layout;
pub mod models;
pub mod program_db;
pub mod util;

pub use config::*;
pub use context::*;
pub use layout::*;
pub use models::*;
pub use program_db::*;
pub use util::*;
