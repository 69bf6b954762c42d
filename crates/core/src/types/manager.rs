use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::dwarf::{AttributeKindError, AttributeName, DebugEntryTree, DebugInfoEntry, EntryId, Tag};
use crate::types::fundamental::{fundamental_type, is_pointer_modifier, FT_POINTER};
use crate::types::{CompositeKind, DataType, DataTypeHandle, Endianness, TypeResolver};

/// DWARF v1 type resolver backed by an entry tree.
///
/// User-defined types are resolved lazily and cached per entry id, so every
/// identity maps to exactly one handle for the lifetime of the manager.
pub struct DwarfTypeManager<'a> {
    tree: &'a DebugEntryTree,
    endianness: Endianness,
    cache: RefCell<HashMap<EntryId, DataTypeHandle>>,
    in_progress: RefCell<HashSet<EntryId>>,
    void: DataTypeHandle,
    undefined: DataTypeHandle,
}

impl<'a> DwarfTypeManager<'a> {
    pub fn new(tree: &'a DebugEntryTree, endianness: Endianness) -> Self {
        Self {
            tree,
            endianness,
            cache: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
            void: Arc::new(DataType::Void),
            undefined: Arc::new(DataType::Undefined),
        }
    }

    /// Resolve every type-defining entry in the tree up front.
    ///
    /// Returns the number of user-defined types now cached.
    pub fn register_user_types(&self) -> usize {
        for entry in self.tree.entries() {
            if is_user_type_tag(entry.tag()) {
                let _ = self.user_data_type(entry.id());
            }
        }
        self.cache.borrow().len()
    }

    fn fundamental(&self, code: u16) -> DataTypeHandle {
        if code == FT_POINTER {
            return Arc::new(DataType::Pointer(self.void.clone()));
        }
        match fundamental_type(code) {
            Some(DataType::Void) => self.void.clone(),
            Some(dt) => Arc::new(dt),
            None => {
                debug!(code, "unknown fundamental type code");
                self.undefined.clone()
            }
        }
    }

    fn user_or_undefined(&self, id: EntryId) -> DataTypeHandle {
        self.user_data_type(id).unwrap_or_else(|| self.undefined.clone())
    }

    /// `MOD_FUND_TYPE`: modifier bytes followed by a 2-byte type code.
    fn mod_fund_type(&self, block: &[u8]) -> DataTypeHandle {
        let Some(split) = block.len().checked_sub(2) else {
            return self.undefined.clone();
        };
        let (modifiers, code) = block.split_at(split);
        let code = [code[0], code[1]];
        let code = match self.endianness {
            Endianness::Little => u16::from_le_bytes(code),
            Endianness::Big => u16::from_be_bytes(code),
        };
        self.apply_modifiers(modifiers, self.fundamental(code))
    }

    /// `MOD_U_D_TYPE`: modifier bytes followed by a 4-byte entry reference.
    fn mod_user_def_type(&self, block: &[u8]) -> DataTypeHandle {
        let Some(split) = block.len().checked_sub(4) else {
            return self.undefined.clone();
        };
        let (modifiers, reference) = block.split_at(split);
        let reference = [reference[0], reference[1], reference[2], reference[3]];
        let reference = match self.endianness {
            Endianness::Little => u32::from_le_bytes(reference),
            Endianness::Big => u32::from_be_bytes(reference),
        };
        self.apply_modifiers(modifiers, self.user_or_undefined(EntryId(u64::from(reference))))
    }

    // The first modifier is the outermost one.
    fn apply_modifiers(&self, modifiers: &[u8], base: DataTypeHandle) -> DataTypeHandle {
        modifiers.iter().rev().fold(base, |dt, &modifier| {
            if is_pointer_modifier(modifier) {
                Arc::new(DataType::Pointer(dt))
            } else {
                dt
            }
        })
    }

    fn declared_type(
        &self,
        entry: &DebugInfoEntry,
    ) -> Result<Option<DataTypeHandle>, AttributeKindError> {
        if let Some(code) = entry.constant_attribute(AttributeName::FundType)? {
            let dt = match u16::try_from(code) {
                Ok(code) => self.fundamental(code),
                Err(_) => {
                    debug!(code, "fundamental type code out of range");
                    self.undefined.clone()
                }
            };
            return Ok(Some(dt));
        }
        if let Some(id) = entry.reference_attribute(AttributeName::UserDefType)? {
            return Ok(Some(self.user_or_undefined(id)));
        }
        if let Some(block) = entry.block_attribute(AttributeName::ModFundType)? {
            return Ok(Some(self.mod_fund_type(block)));
        }
        if let Some(block) = entry.block_attribute(AttributeName::ModUDType)? {
            return Ok(Some(self.mod_user_def_type(block)));
        }
        Ok(None)
    }

    fn build_user_type(&self, entry: &DebugInfoEntry) -> Option<DataTypeHandle> {
        let name = entry
            .string_attribute(AttributeName::Name)
            .ok()
            .flatten()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("anon_{:x}", entry.id().0));
        let size = entry.constant_attribute(AttributeName::ByteSize).ok().flatten();

        let kind = match entry.tag() {
            Tag::ClassType => Some(CompositeKind::Class),
            Tag::StructureType => Some(CompositeKind::Struct),
            Tag::UnionType => Some(CompositeKind::Union),
            _ => None,
        };
        if let Some(kind) = kind {
            return Some(Arc::new(DataType::Composite { kind, name, size }));
        }

        match entry.tag() {
            Tag::EnumerationType => Some(Arc::new(DataType::Enum { name, size })),
            Tag::Typedef => {
                let target = self.extract_data_type(entry);
                Some(Arc::new(DataType::Typedef { name, target }))
            }
            // Array subscript data and subroutine types are not decoded.
            Tag::ArrayType | Tag::SubroutineType => Some(self.undefined.clone()),
            _ => None,
        }
    }
}

fn is_user_type_tag(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::ClassType
            | Tag::StructureType
            | Tag::UnionType
            | Tag::EnumerationType
            | Tag::Typedef
            | Tag::ArrayType
            | Tag::SubroutineType
    )
}

impl TypeResolver for DwarfTypeManager<'_> {
    fn extract_data_type(&self, entry: &DebugInfoEntry) -> DataTypeHandle {
        match self.declared_type(entry) {
            Ok(Some(dt)) => dt,
            Ok(None) => match entry.tag() {
                Tag::Subroutine | Tag::GlobalSubroutine | Tag::SubroutineType => self.void.clone(),
                _ => self.undefined.clone(),
            },
            Err(err) => {
                debug!(%err, "falling back to undefined type");
                self.undefined.clone()
            }
        }
    }

    fn user_data_type(&self, id: EntryId) -> Option<DataTypeHandle> {
        if let Some(dt) = self.cache.borrow().get(&id) {
            return Some(dt.clone());
        }
        let entry = self.tree.entry(id)?;
        if !self.in_progress.borrow_mut().insert(id) {
            debug!(entry = %id, "type reference cycle");
            return Some(self.undefined.clone());
        }
        let built = self.build_user_type(entry);
        self.in_progress.borrow_mut().remove(&id);

        let dt = built?;
        Some(self.cache.borrow_mut().entry(id).or_insert(dt).clone())
    }
}
