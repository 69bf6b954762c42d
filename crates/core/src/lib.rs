//! dwarfone-core
//!
//! Imports functions described by DWARF version 1 debugging entries into a
//! program model.
//!
//! The crate holds the debug-entry tree, the DWARF v1 type manager, the
//! function importer and the SQLite-backed program database. Frontends (the
//! `dwarfone` CLI) only wire these together.

pub mod db;
pub mod diagnostics;
pub mod dwarf;
pub mod import;
pub mod program;
pub mod types;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
