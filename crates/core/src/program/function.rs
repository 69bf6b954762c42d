use serde::{Deserialize, Serialize};

use crate::program::{Address, AddressRange};
use crate::types::DataTypeHandle;

/// Row id of a function in the program model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(pub i64);

/// Provenance of a name or signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Default,
    Analysis,
    Imported,
    UserDefined,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Default => "default",
            SourceType::Analysis => "analysis",
            SourceType::Imported => "imported",
            SourceType::UserDefined => "user_defined",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "analysis" => SourceType::Analysis,
            "imported" => SourceType::Imported,
            "user_defined" => SourceType::UserDefined,
            _ => SourceType::Default,
        }
    }
}

/// How parameter storage is assigned when a signature is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionUpdateType {
    /// Storage for formal parameters comes from the calling convention.
    DynamicStorageFormalParams,
    /// Same as above, including auto-parameters.
    DynamicStorageAllParams,
    /// Storage is given by the caller; the model does not assign any.
    CustomStorage,
}

impl FunctionUpdateType {
    pub fn is_dynamic(self) -> bool {
        !matches!(self, FunctionUpdateType::CustomStorage)
    }
}

/// A formal parameter to commit: optional name and its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: Option<String>,
    pub data_type: DataTypeHandle,
}

impl Parameter {
    pub fn new(name: Option<String>, data_type: DataTypeHandle) -> Self {
        Self { name, data_type }
    }
}

/// Signature replacement for one function.
#[derive(Debug, Clone)]
pub struct FunctionUpdate {
    pub return_type: DataTypeHandle,
    pub params: Vec<Parameter>,
    pub update_type: FunctionUpdateType,
    /// Replace the signature even when its current source outranks `source`.
    pub force: bool,
    pub source: SourceType,
}

/// Persisted view of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub ordinal: u32,
    pub name: Option<String>,
    pub data_type: String,
    /// Register name or `Stack[0x..]`; `None` for custom storage.
    pub storage: Option<String>,
}

/// Persisted view of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: FunctionId,
    pub name: String,
    pub entry: Address,
    pub body: Vec<AddressRange>,
    pub name_source: SourceType,
    pub return_type: Option<String>,
    pub signature_source: Option<SourceType>,
    pub params: Vec<ParameterRecord>,
}
