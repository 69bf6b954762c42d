use anyhow::Result;
use clap::{Parser, Subcommand};
use dwarfone::commands::{
    add_block_command, import_command, init_project_command, list_functions_command,
    list_runs_command, project_info_command,
};
use dwarfone::init_logging;

/// DWARF v1 function importer CLI.
///
/// This CLI is a thin wrapper around `dwarfone-core` (exposed in code as
/// `dwarfone_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "dwarfone",
    version,
    about = "Import functions from DWARF v1 debug entries",
    long_about = None
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new dwarfone project at the given root.
    ///
    /// This will:
    /// - Create a `.dwarfone` metadata directory.
    /// - Write a `.dwarfone/project.json` config file.
    /// - Create the program database.
    InitProject {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional project name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,

        /// Width of the target's address space, in bits.
        #[arg(long, default_value_t = 32)]
        address_size: u8,

        /// Target is big-endian (affects decoding of type modifier blocks).
        #[arg(long, default_value_t = false)]
        big_endian: bool,
    },

    /// Show information about an existing project.
    ProjectInfo {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Add a memory block to the program's valid address set.
    AddBlock {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Block name (e.g., `.text`).
        #[arg(long)]
        name: String,

        /// First address (hex with `0x` prefix, or decimal).
        #[arg(long)]
        start: String,

        /// One past the last address (hex with `0x` prefix, or decimal).
        #[arg(long)]
        end: String,
    },

    /// Import subroutine entries from a JSON or YAML entry dump.
    Import {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Path to the entry dump (`.json`, `.yaml`, or `.yml`).
        #[arg(long)]
        entries: String,
    },

    /// List functions in the program database.
    ListFunctions {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List recorded import runs.
    ListRuns {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::InitProject { root, name, address_size, big_endian } => {
            init_project_command(&root, name, address_size, big_endian)?
        }
        Command::ProjectInfo { root, json } => project_info_command(&root, json)?,
        Command::AddBlock { root, name, start, end } => {
            add_block_command(&root, &name, &start, &end)?
        }
        Command::Import { root, entries } => import_command(&root, &entries)?,
        Command::ListFunctions { root, json } => list_functions_command(&root, json)?,
        Command::ListRuns { root, json } => list_runs_command(&root, json)?,
    }

    Ok(())
}
