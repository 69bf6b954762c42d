//! Subroutine import: turns DWARF v1 subroutine entries into functions in a
//! [`ProgramModel`].

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diagnostics::MessageLog;
use crate::dwarf::{DebugEntryTree, Tag};
use crate::program::{FunctionId, ProgramModel};
use crate::types::TypeResolver;

pub mod function;
pub mod member_class;
pub mod names;

pub use function::{FunctionImporter, ImportError};
pub use member_class::determine_member_class;
pub use names::{extract_name, qualify_name};

/// What happened to one subroutine entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Missing name or pc bounds; nothing logged.
    Skipped,
    Created(FunctionId),
    /// A function already existed at the entry point and was renamed.
    Renamed(FunctionId),
    /// The failure was written to the message log.
    Failed,
}

/// Per-outcome counts for one import pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: u32,
    pub renamed: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl ImportSummary {
    pub fn record(&mut self, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Skipped => self.skipped += 1,
            ImportOutcome::Created(_) => self.created += 1,
            ImportOutcome::Renamed(_) => self.renamed += 1,
            ImportOutcome::Failed => self.failed += 1,
        }
    }

    /// Entries that produced or touched a function.
    pub fn imported(&self) -> u32 {
        self.created + self.renamed
    }

    pub fn total(&self) -> u32 {
        self.imported() + self.skipped + self.failed
    }
}

pub fn is_subroutine(tag: Tag) -> bool {
    matches!(tag, Tag::Subroutine | Tag::GlobalSubroutine)
}

/// Run [`FunctionImporter::process_subroutine`] over every subroutine entry
/// of `tree`, in dump order.
pub fn import_functions<P, T>(
    tree: &DebugEntryTree,
    program: &mut P,
    types: &T,
    log: &mut MessageLog,
) -> ImportSummary
where
    P: ProgramModel + ?Sized,
    T: TypeResolver + ?Sized,
{
    let mut importer = FunctionImporter::new(tree, program, types, log);
    let mut summary = ImportSummary::default();
    for entry in tree.entries().filter(|entry| is_subroutine(entry.tag())) {
        summary.record(importer.process_subroutine(entry));
    }
    info!(
        created = summary.created,
        renamed = summary.renamed,
        skipped = summary.skipped,
        failed = summary.failed,
        "subroutine import finished"
    );
    summary
}
