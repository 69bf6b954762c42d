//! Data types and the type resolution service.
//!
//! The importer never builds data types itself. It asks a [`TypeResolver`]
//! for them and only reads the returned handles.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dwarf::{DebugInfoEntry, EntryId};

pub mod fundamental;
pub mod manager;

pub use manager::DwarfTypeManager;

/// Shared handle to a resolved data type. Owned by the resolver's cache.
pub type DataTypeHandle = Arc<DataType>;

/// Flavour of an aggregate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeKind {
    Class,
    Struct,
    Union,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Void,
    /// Opaque fallback for anything the resolver does not understand.
    Undefined,
    Base { name: &'static str, size: u32 },
    Pointer(DataTypeHandle),
    Composite { kind: CompositeKind, name: String, size: Option<u64> },
    Enum { name: String, size: Option<u64> },
    Typedef { name: String, target: DataTypeHandle },
}

impl DataType {
    /// Display name, e.g. `Widget *` for a pointer to `Widget`.
    pub fn name(&self) -> String {
        match self {
            DataType::Void => "void".to_string(),
            DataType::Undefined => "undefined".to_string(),
            DataType::Base { name, .. } => (*name).to_string(),
            DataType::Pointer(target) => format!("{} *", target.name()),
            DataType::Composite { name, .. } => name.clone(),
            DataType::Enum { name, .. } => name.clone(),
            DataType::Typedef { name, .. } => name.clone(),
        }
    }

    /// Pointee when this is a pointer. Typedefs of pointers are not unwrapped.
    pub fn pointee(&self) -> Option<&DataTypeHandle> {
        match self {
            DataType::Pointer(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Byte order used to decode multi-byte values inside attribute blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Type resolution service consumed by the importer.
pub trait TypeResolver {
    /// Resolve the type an entry declares (return type for subroutines,
    /// declared type for parameters). Never fails: unknown or unsupported
    /// types come back as a fallback type.
    fn extract_data_type(&self, entry: &DebugInfoEntry) -> DataTypeHandle;

    /// User-defined type registered for an entry identity, if any.
    fn user_data_type(&self, id: EntryId) -> Option<DataTypeHandle>;
}
