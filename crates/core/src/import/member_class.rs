//! Owning-class resolution for subroutine entries.
//!
//! No single DWARF v1 attribute says which class a function belongs to on
//! every toolchain, so three independent heuristics are tried in order and
//! the first one that answers wins:
//!
//! 1. lexical nesting: the entry's parent is a `class_type`;
//! 2. an `AT_member` reference on the entry (out-of-line definitions);
//! 3. a `this` formal parameter, for compilers that emit neither
//!    (seen in PS2 toolchains).

use tracing::debug;

use crate::dwarf::{AttributeName, DebugEntryTree, DebugInfoEntry, Tag};
use crate::import::names::has_name;
use crate::types::{DataTypeHandle, TypeResolver};

/// One ownership heuristic: `None` means "no opinion, try the next one".
pub type MemberClassHeuristic<T> =
    fn(&DebugEntryTree, &T, &DebugInfoEntry) -> Option<DataTypeHandle>;

/// Owning class of `entry`, or `None` for a free function.
pub fn determine_member_class<T: TypeResolver + ?Sized>(
    tree: &DebugEntryTree,
    types: &T,
    entry: &DebugInfoEntry,
) -> Option<DataTypeHandle> {
    let heuristics: [MemberClassHeuristic<T>; 3] =
        [lexical_parent_class, member_attribute_class, this_parameter_class];
    heuristics.iter().find_map(|heuristic| heuristic(tree, types, entry))
}

/// Method defined inside the class body.
pub fn lexical_parent_class<T: TypeResolver + ?Sized>(
    tree: &DebugEntryTree,
    types: &T,
    entry: &DebugInfoEntry,
) -> Option<DataTypeHandle> {
    let parent = tree.parent(entry)?;
    if parent.tag() != Tag::ClassType {
        return None;
    }
    types.user_data_type(parent.id())
}

/// Method defined outside the class body, carrying `AT_member`.
pub fn member_attribute_class<T: TypeResolver + ?Sized>(
    _tree: &DebugEntryTree,
    types: &T,
    entry: &DebugInfoEntry,
) -> Option<DataTypeHandle> {
    match entry.reference_attribute(AttributeName::Member) {
        Ok(Some(class)) => types.user_data_type(class),
        Ok(None) => None,
        Err(err) => {
            debug!(%err, "ignoring member attribute");
            None
        }
    }
}

/// Class taken from the type of the first `this` parameter.
pub fn this_parameter_class<T: TypeResolver + ?Sized>(
    tree: &DebugEntryTree,
    types: &T,
    entry: &DebugInfoEntry,
) -> Option<DataTypeHandle> {
    let this = tree
        .children_tagged(entry, Tag::FormalParameter)
        .find(|child| has_name(child, "this"))?;
    let dt = types.extract_data_type(this);
    let class = match dt.pointee() {
        Some(pointee) => pointee.clone(),
        None => dt.clone(),
    };
    Some(class)
}
