use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entry::{AttributeName, AttributeValue, DebugInfoEntry, EntryId, Tag};

/// Error type for building an entry tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Duplicate entry id {0}")]
    DuplicateEntry(EntryId),

    #[error("Entry {parent} lists unknown child {child}")]
    UnknownChild { parent: EntryId, child: EntryId },

    #[error("Entry {child} is listed as a child of both {first} and {second}")]
    MultipleParents { child: EntryId, first: EntryId, second: EntryId },

    #[error("Failed to parse JSON entry dump: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML entry dump: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Flat, serializable description of one entry, as handed over by the
/// section parser. Parent links are derived from `children` when the tree
/// is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDescription {
    pub id: EntryId,
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<AttributeName, AttributeValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntryId>,
}

impl EntryDescription {
    pub fn new(id: u64, tag: Tag) -> Self {
        Self { id: EntryId(id), tag, attributes: BTreeMap::new(), children: Vec::new() }
    }

    pub fn with_attribute(mut self, name: AttributeName, value: AttributeValue) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_attribute(AttributeName::Name, AttributeValue::String(name.into()))
    }

    pub fn with_pc_range(self, low: u64, high: u64) -> Self {
        self.with_attribute(AttributeName::LowPc, AttributeValue::Address(low))
            .with_attribute(AttributeName::HighPc, AttributeValue::Address(high))
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = u64>) -> Self {
        self.children.extend(children.into_iter().map(EntryId));
        self
    }
}

/// On-disk shape of an entry dump (JSON or YAML).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryDump {
    pub entries: Vec<EntryDescription>,
}

/// Parsed debug entry tree.
///
/// The tree owns every entry; entries refer to each other by [`EntryId`].
#[derive(Debug, Clone, Default)]
pub struct DebugEntryTree {
    entries: Vec<DebugInfoEntry>,
    index: HashMap<EntryId, usize>,
}

impl DebugEntryTree {
    /// Build a tree from flat descriptions, keeping their order.
    pub fn new(descriptions: Vec<EntryDescription>) -> Result<Self, TreeError> {
        let mut index = HashMap::with_capacity(descriptions.len());
        for (pos, desc) in descriptions.iter().enumerate() {
            if index.insert(desc.id, pos).is_some() {
                return Err(TreeError::DuplicateEntry(desc.id));
            }
        }

        let mut parents: Vec<Option<EntryId>> = vec![None; descriptions.len()];
        for desc in &descriptions {
            for child in &desc.children {
                let pos = *index
                    .get(child)
                    .ok_or(TreeError::UnknownChild { parent: desc.id, child: *child })?;
                if let Some(first) = parents[pos] {
                    return Err(TreeError::MultipleParents {
                        child: *child,
                        first,
                        second: desc.id,
                    });
                }
                parents[pos] = Some(desc.id);
            }
        }

        let entries = descriptions
            .into_iter()
            .zip(parents)
            .map(|(desc, parent)| DebugInfoEntry {
                id: desc.id,
                tag: desc.tag,
                attributes: desc.attributes,
                children: desc.children,
                parent,
            })
            .collect();

        Ok(Self { entries, index })
    }

    pub fn from_json_str(input: &str) -> Result<Self, TreeError> {
        let dump: EntryDump = serde_json::from_str(input)?;
        Self::new(dump.entries)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, TreeError> {
        let dump: EntryDump = serde_yaml::from_str(input)?;
        Self::new(dump.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in dump order.
    pub fn entries(&self) -> impl Iterator<Item = &DebugInfoEntry> {
        self.entries.iter()
    }

    pub fn entry(&self, id: EntryId) -> Option<&DebugInfoEntry> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn parent(&self, entry: &DebugInfoEntry) -> Option<&DebugInfoEntry> {
        entry.parent.and_then(|id| self.entry(id))
    }

    /// Direct children of `entry`, in order.
    pub fn children<'a>(
        &'a self,
        entry: &'a DebugInfoEntry,
    ) -> impl Iterator<Item = &'a DebugInfoEntry> + 'a {
        entry.children.iter().filter_map(move |id| self.entry(*id))
    }

    /// Direct children of `entry` carrying `tag`.
    pub fn children_tagged<'a>(
        &'a self,
        entry: &'a DebugInfoEntry,
        tag: Tag,
    ) -> impl Iterator<Item = &'a DebugInfoEntry> + 'a {
        self.children(entry).filter(move |child| child.tag == tag)
    }
}
