//! Program model the importer writes into.
//!
//! The importer only talks to the [`ProgramModel`] trait. The SQLite-backed
//! implementation lives in [`crate::db::ProgramDb`].

use thiserror::Error;

pub mod address;
pub mod function;
pub mod settings;

pub use address::{Address, AddressRange, AddressSet};
pub use function::{
    FunctionId, FunctionRecord, FunctionUpdate, FunctionUpdateType, Parameter, ParameterRecord,
    SourceType,
};
pub use settings::{CallingConvention, ProgramSettings};

/// Error type for program model operations.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// Another function already uses the name.
    #[error("Duplicate function name '{name}' (already used at {existing})")]
    DuplicateName { name: String, existing: Address },

    /// Name or argument rejected by the model.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The new body intersects another function's body.
    #[error("Function at {entry} overlaps existing function at {existing}")]
    OverlappingFunction { entry: Address, existing: Address },

    #[error("Offset {offset:#x} does not fit a {bits}-bit address space")]
    AddressOutOfBounds { offset: u64, bits: u8 },

    #[error("No function with id {0}")]
    FunctionNotFound(i64),

    /// The signature was set by a user and `force` was not given.
    #[error("Signature of function at {0} is user-defined; refusing to replace it")]
    SignatureLocked(Address),

    #[error(transparent)]
    Db(#[from] crate::db::DbError),
}

impl From<rusqlite::Error> for ProgramError {
    fn from(err: rusqlite::Error) -> Self {
        ProgramError::Db(err.into())
    }
}

/// Convenience result type for program model operations.
pub type ProgramResult<T> = Result<T, ProgramError>;

/// Destination store for imported functions.
pub trait ProgramModel {
    /// Translate a raw offset into an address of the default space.
    fn to_addr(&self, offset: u64) -> ProgramResult<Address>;

    /// Set of valid (mapped) addresses.
    fn address_set(&self) -> ProgramResult<AddressSet>;

    fn function_at(&self, entry: Address) -> ProgramResult<Option<FunctionId>>;

    fn create_function(
        &mut self,
        name: &str,
        entry: Address,
        body: &AddressSet,
        source: SourceType,
    ) -> ProgramResult<FunctionId>;

    fn rename_function(
        &mut self,
        id: FunctionId,
        name: &str,
        source: SourceType,
    ) -> ProgramResult<()>;

    /// Replace the return type and parameter list of a function.
    fn update_function(&mut self, id: FunctionId, update: &FunctionUpdate) -> ProgramResult<()>;
}

/// Validate a symbol name: non-empty, no whitespace or control characters.
pub fn validate_name(name: &str) -> ProgramResult<()> {
    if name.is_empty() {
        return Err(ProgramError::InvalidInput("function name is empty".to_string()));
    }
    if let Some(c) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(ProgramError::InvalidInput(format!(
            "function name '{}' contains invalid character {:?}",
            name.escape_debug(),
            c
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_name_rejects_blank_and_spaced_names() {
        assert!(validate_name("Widget::foo").is_ok());
        assert!(matches!(validate_name(""), Err(ProgramError::InvalidInput(_))));
        assert!(matches!(validate_name("operator new"), Err(ProgramError::InvalidInput(_))));
        assert!(matches!(validate_name("tab\tname"), Err(ProgramError::InvalidInput(_))));
    }
}
