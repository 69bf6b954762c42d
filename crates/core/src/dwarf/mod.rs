//! Pre-parsed DWARF v1 debug entry tree.
//!
//! Parsing the raw `.debug` section is done elsewhere; this module only
//! models the result:
//! - `DebugInfoEntry`: tag, typed attributes, child ids and a parent id.
//! - `DebugEntryTree`: arena owning every entry, with upward and downward lookup.
//! - `EntryDump`: the JSON/YAML shape a parser hands over.

pub mod entry;
pub mod tree;

pub use entry::{
    AttributeKind, AttributeKindError, AttributeName, AttributeValue, DebugInfoEntry, EntryId, Tag,
};
pub use tree::{DebugEntryTree, EntryDescription, EntryDump, TreeError};
