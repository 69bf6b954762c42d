use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a debug entry (its offset in the `.debug` section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:#x}>", self.0)
    }
}

/// DWARF v1 entry tags.
///
/// Only the tags the importer and type manager look at are named; anything
/// else deserializes as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    ArrayType,
    ClassType,
    CompileUnit,
    EnumerationType,
    FormalParameter,
    GlobalSubroutine,
    GlobalVariable,
    InlinedSubroutine,
    LexicalBlock,
    LocalVariable,
    Member,
    StructureType,
    Subroutine,
    SubroutineType,
    Typedef,
    UnionType,
    UnspecifiedParameters,
    #[serde(other)]
    Unknown,
}

/// DWARF v1 attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeName {
    Sibling,
    Location,
    Name,
    FundType,
    ModFundType,
    UserDefType,
    #[serde(rename = "mod_u_d_type")]
    ModUDType,
    ByteSize,
    StmtList,
    LowPc,
    HighPc,
    Language,
    Member,
    CompDir,
    Producer,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttributeName::Sibling => "AT_sibling",
            AttributeName::Location => "AT_location",
            AttributeName::Name => "AT_name",
            AttributeName::FundType => "AT_fund_type",
            AttributeName::ModFundType => "AT_mod_fund_type",
            AttributeName::UserDefType => "AT_user_def_type",
            AttributeName::ModUDType => "AT_mod_u_d_type",
            AttributeName::ByteSize => "AT_byte_size",
            AttributeName::StmtList => "AT_stmt_list",
            AttributeName::LowPc => "AT_low_pc",
            AttributeName::HighPc => "AT_high_pc",
            AttributeName::Language => "AT_language",
            AttributeName::Member => "AT_member",
            AttributeName::CompDir => "AT_comp_dir",
            AttributeName::Producer => "AT_producer",
            AttributeName::Unknown => "AT_unknown",
        };
        f.write_str(s)
    }
}

/// Kind of value carried by an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Address,
    Reference,
    String,
    Constant,
    Block,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttributeKind::Address => "address",
            AttributeKind::Reference => "reference",
            AttributeKind::String => "string",
            AttributeKind::Constant => "constant",
            AttributeKind::Block => "block",
        };
        f.write_str(s)
    }
}

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    Address(u64),
    Reference(EntryId),
    String(String),
    Constant(u64),
    Block(Vec<u8>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Address(_) => AttributeKind::Address,
            AttributeValue::Reference(_) => AttributeKind::Reference,
            AttributeValue::String(_) => AttributeKind::String,
            AttributeValue::Constant(_) => AttributeKind::Constant,
            AttributeValue::Block(_) => AttributeKind::Block,
        }
    }
}

/// An attribute was read through an accessor for a different kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeKindError {
    #[error("{entry}: attribute {name} is a {found} value, expected {expected}")]
    WrongAttributeKind {
        entry: EntryId,
        name: AttributeName,
        expected: AttributeKind,
        found: AttributeKind,
    },
}

/// One node of the debug entry tree.
///
/// Entries are immutable once the owning [`DebugEntryTree`](super::DebugEntryTree)
/// is built. The parent link is an id, resolved through the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfoEntry {
    pub(crate) id: EntryId,
    pub(crate) tag: Tag,
    pub(crate) attributes: BTreeMap<AttributeName, AttributeValue>,
    pub(crate) children: Vec<EntryId>,
    pub(crate) parent: Option<EntryId>,
}

impl DebugInfoEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn parent_id(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn child_ids(&self) -> &[EntryId] {
        &self.children
    }

    pub fn attributes(&self) -> &BTreeMap<AttributeName, AttributeValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: AttributeName) -> Option<&AttributeValue> {
        self.attributes.get(&name)
    }

    pub fn has_attribute(&self, name: AttributeName) -> bool {
        self.attributes.contains_key(&name)
    }

    fn wrong_kind(
        &self,
        name: AttributeName,
        expected: AttributeKind,
        value: &AttributeValue,
    ) -> AttributeKindError {
        AttributeKindError::WrongAttributeKind {
            entry: self.id,
            name,
            expected,
            found: value.kind(),
        }
    }

    pub fn address_attribute(
        &self,
        name: AttributeName,
    ) -> Result<Option<u64>, AttributeKindError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(AttributeValue::Address(addr)) => Ok(Some(*addr)),
            Some(other) => Err(self.wrong_kind(name, AttributeKind::Address, other)),
        }
    }

    pub fn reference_attribute(
        &self,
        name: AttributeName,
    ) -> Result<Option<EntryId>, AttributeKindError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(AttributeValue::Reference(id)) => Ok(Some(*id)),
            Some(other) => Err(self.wrong_kind(name, AttributeKind::Reference, other)),
        }
    }

    pub fn string_attribute(
        &self,
        name: AttributeName,
    ) -> Result<Option<&str>, AttributeKindError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(AttributeValue::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.wrong_kind(name, AttributeKind::String, other)),
        }
    }

    pub fn constant_attribute(
        &self,
        name: AttributeName,
    ) -> Result<Option<u64>, AttributeKindError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(AttributeValue::Constant(value)) => Ok(Some(*value)),
            Some(other) => Err(self.wrong_kind(name, AttributeKind::Constant, other)),
        }
    }

    pub fn block_attribute(
        &self,
        name: AttributeName,
    ) -> Result<Option<&[u8]>, AttributeKindError> {
        match self.attribute(name) {
            None => Ok(None),
            Some(AttributeValue::Block(bytes)) => Ok(Some(bytes.as_slice())),
            Some(other) => Err(self.wrong_kind(name, AttributeKind::Block, other)),
        }
    }
}
