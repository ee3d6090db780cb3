//! Ordered selection store.
//!
//! A key sequence plus a key → item map. Keys are unique and iteration follows
//! insertion order; removing and re-adding a key moves it to the end.

use crate::catalog::Item;
use std::collections::HashMap;

/// Result of a [`Selection::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    order: Vec<String>,
    items: HashMap<String, Item>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.items.contains_key(value)
    }

    pub fn get(&self, value: &str) -> Option<&Item> {
        self.items.get(value)
    }

    /// Remove `item.value` if present, otherwise append `item`.
    pub fn toggle(&mut self, item: &Item) -> Toggled {
        if self.remove(&item.value) {
            Toggled::Removed
        } else {
            self.order.push(item.value.clone());
            self.items.insert(item.value.clone(), item.clone());
            Toggled::Added
        }
    }

    /// Remove `value`; returns whether anything changed.
    pub fn remove(&mut self, value: &str) -> bool {
        if self.items.remove(value).is_none() {
            return false;
        }
        if let Some(pos) = self.order.iter().position(|v| v == value) {
            self.order.remove(pos);
        }
        true
    }

    /// Items in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.order.iter().filter_map(|v| self.items.get(v))
    }

    /// Owned snapshot in selection order, as handed to change listeners.
    pub fn to_vec(&self) -> Vec<Item> {
        self.iter().cloned().collect()
    }
}
