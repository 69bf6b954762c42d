use crate::dwarf::{AttributeKindError, AttributeName, DebugInfoEntry};

/// Name of an entry: the NAME attribute when present and non-empty.
///
/// The value is returned as-is; no demangling or normalization.
pub fn extract_name(entry: &DebugInfoEntry) -> Result<Option<String>, AttributeKindError> {
    Ok(entry
        .string_attribute(AttributeName::Name)?
        .filter(|name| !name.is_empty())
        .map(str::to_string))
}

/// Whether the entry's name is exactly `expected`. Wrong-kind names never match.
pub fn has_name(entry: &DebugInfoEntry, expected: &str) -> bool {
    matches!(entry.string_attribute(AttributeName::Name), Ok(Some(name)) if name == expected)
}

/// `"<class>::<name>"`, unless `name` already mentions the class.
pub fn qualify_name(name: &str, class_name: &str) -> String {
    if name.contains(class_name) {
        name.to_string()
    } else {
        format!("{class_name}::{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwarf::{AttributeValue, DebugEntryTree, EntryDescription, Tag};

    fn single(desc: EntryDescription) -> DebugEntryTree {
        DebugEntryTree::new(vec![desc]).unwrap()
    }

    #[test]
    fn extract_name_ignores_empty_names() {
        let tree = single(EntryDescription::new(1, Tag::Subroutine).with_name(""));
        let entry = tree.entry(crate::dwarf::EntryId(1)).unwrap();
        assert_eq!(extract_name(entry).unwrap(), None);
    }

    #[test]
    fn extract_name_reports_wrong_kind() {
        let tree = single(
            EntryDescription::new(1, Tag::Subroutine)
                .with_attribute(AttributeName::Name, AttributeValue::Address(0x10)),
        );
        let entry = tree.entry(crate::dwarf::EntryId(1)).unwrap();
        assert!(extract_name(entry).is_err());
        assert!(!has_name(entry, "this"));
    }

    #[test]
    fn qualify_name_skips_names_already_mentioning_the_class() {
        assert_eq!(qualify_name("foo", "Widget"), "Widget::foo");
        assert_eq!(qualify_name("Widget::bar", "Widget"), "Widget::bar");
        // Substring match, not a prefix match.
        assert_eq!(qualify_name("~Widget", "Widget"), "~Widget");
    }
}
