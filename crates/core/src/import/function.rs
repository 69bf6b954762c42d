use thiserror::Error;
use tracing::debug;

use crate::diagnostics::MessageLog;
use crate::dwarf::{AttributeKindError, AttributeName, DebugEntryTree, DebugInfoEntry, EntryId, Tag};
use crate::import::member_class::determine_member_class;
use crate::import::names::{extract_name, qualify_name};
use crate::import::ImportOutcome;
use crate::program::{
    Address, FunctionUpdate, FunctionUpdateType, Parameter, ProgramError, ProgramModel, SourceType,
};
use crate::types::TypeResolver;

/// Reasons a single subroutine could not be imported.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Attribute(#[from] AttributeKindError),

    #[error("Subroutine {entry} has high pc {high} below low pc {low}")]
    InvertedRange { entry: EntryId, low: Address, high: Address },

    #[error("Failed to import subroutine '{name}' ({entry})")]
    Program {
        entry: EntryId,
        name: String,
        #[source]
        source: ProgramError,
    },
}

/// Imports subroutine entries into a program model.
///
/// Holds the shared collaborators for one import pass. Failures for one entry
/// are written to the message log and never propagate to the caller.
pub struct FunctionImporter<'a, P: ProgramModel + ?Sized, T: TypeResolver + ?Sized> {
    tree: &'a DebugEntryTree,
    program: &'a mut P,
    types: &'a T,
    log: &'a mut MessageLog,
}

impl<'a, P: ProgramModel + ?Sized, T: TypeResolver + ?Sized> FunctionImporter<'a, P, T> {
    pub fn new(
        tree: &'a DebugEntryTree,
        program: &'a mut P,
        types: &'a T,
        log: &'a mut MessageLog,
    ) -> Self {
        Self { tree, program, types, log }
    }

    /// Create or rename the function described by `entry` and replace its
    /// signature.
    ///
    /// Entries lacking a name or either pc bound are skipped without a log
    /// message.
    pub fn process_subroutine(&mut self, entry: &DebugInfoEntry) -> ImportOutcome {
        match self.try_process(entry) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.log.append_exception(&err);
                ImportOutcome::Failed
            }
        }
    }

    fn try_process(&mut self, entry: &DebugInfoEntry) -> Result<ImportOutcome, ImportError> {
        let required = [AttributeName::Name, AttributeName::LowPc, AttributeName::HighPc];
        if !required.iter().all(|&attr| entry.has_attribute(attr)) {
            return Ok(ImportOutcome::Skipped);
        }
        let Some(mut name) = extract_name(entry)? else {
            return Ok(ImportOutcome::Skipped);
        };
        let (Some(low), Some(high)) = (
            entry.address_attribute(AttributeName::LowPc)?,
            entry.address_attribute(AttributeName::HighPc)?,
        ) else {
            return Ok(ImportOutcome::Skipped);
        };

        let program_err = |name: &str, source: ProgramError| ImportError::Program {
            entry: entry.id(),
            name: name.to_string(),
            source,
        };

        let low = self.program.to_addr(low).map_err(|e| program_err(&name, e))?;
        let high = self.program.to_addr(high).map_err(|e| program_err(&name, e))?;
        if high < low {
            return Err(ImportError::InvertedRange { entry: entry.id(), low, high });
        }

        if let Some(class) = determine_member_class(self.tree, self.types, entry) {
            name = qualify_name(&name, &class.name());
        }

        let return_type = self.types.extract_data_type(entry);
        let mut params = Vec::new();
        for param in self.tree.children_tagged(entry, Tag::FormalParameter) {
            params.push(Parameter::new(extract_name(param)?, self.types.extract_data_type(param)));
        }

        let existing = self.program.function_at(low).map_err(|e| program_err(&name, e))?;
        let (id, outcome) = match existing {
            Some(id) => {
                self.program
                    .rename_function(id, &name, SourceType::Imported)
                    .map_err(|e| program_err(&name, e))?;
                (id, ImportOutcome::Renamed(id))
            }
            None => {
                let body = self
                    .program
                    .address_set()
                    .map_err(|e| program_err(&name, e))?
                    .intersect_range(low, high);
                let id = self
                    .program
                    .create_function(&name, low, &body, SourceType::Imported)
                    .map_err(|e| program_err(&name, e))?;
                (id, ImportOutcome::Created(id))
            }
        };

        let update = FunctionUpdate {
            return_type,
            params,
            update_type: FunctionUpdateType::DynamicStorageFormalParams,
            force: true,
            source: SourceType::Imported,
        };
        self.program.update_function(id, &update).map_err(|e| program_err(&name, e))?;

        debug!(entry = %entry.id(), %name, entry_point = %low, ?outcome, "imported subroutine");
        Ok(outcome)
    }
}
