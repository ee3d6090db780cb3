//! Option catalog: flattens ungrouped options and option groups into one
//! ordered candidate sequence with a `value` lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A selectable option. Identity is `value`; `name` is only the label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub value: String,
}

impl Item {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Item {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl AsRef<Item> for Item {
    fn as_ref(&self) -> &Item {
        self
    }
}

/// A named group of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "groupName", alias = "group_name")]
    pub group_name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Group {
    pub fn new(group_name: impl Into<String>, items: Vec<Item>) -> Self {
        Group {
            group_name: group_name.into(),
            items,
        }
    }
}

/// One catalog slot: the item plus the group it was flattened out of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub item: Item,
    pub group: Option<Arc<str>>,
}

/// Every option in source order, plus a `value` → entry lookup.
///
/// Duplicate values are kept in the sequence, but the lookup resolves to the
/// last one (last write wins).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Entry>,
    lookup: HashMap<String, usize>,
}

impl Catalog {
    /// Build the catalog: `options` first, then each group's items in order.
    pub fn build(options: &[Item], groups: &[Group]) -> Self {
        let mut entries = Vec::with_capacity(
            options.len() + groups.iter().map(|g| g.items.len()).sum::<usize>(),
        );
        entries.extend(options.iter().map(|item| Entry {
            item: item.clone(),
            group: None,
        }));
        for group in groups {
            let name: Arc<str> = Arc::from(group.group_name.as_str());
            entries.extend(group.items.iter().map(|item| Entry {
                item: item.clone(),
                group: Some(Arc::clone(&name)),
            }));
        }

        let mut lookup = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if let Some(previous) = lookup.insert(entry.item.value.clone(), index) {
                tracing::warn!(
                    value = %entry.item.value,
                    previous_index = previous,
                    index,
                    "duplicate option value, later entry wins"
                );
            }
        }

        tracing::info!(
            options = options.len(),
            groups = groups.len(),
            entries = entries.len(),
            "catalog built"
        );
        Catalog { entries, lookup }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn get(&self, value: &str) -> Option<&Item> {
        self.lookup.get(value).map(|&i| &self.entries[i].item)
    }

    /// Group the looked-up entry for `value` came from; `None` when the value is
    /// unknown or ungrouped.
    pub fn group_of(&self, value: &str) -> Option<&str> {
        self.lookup
            .get(value)
            .and_then(|&i| self.entries[i].group.as_deref())
    }
}
