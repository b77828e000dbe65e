//! The ordered, duplicate-free set of selected product ids.

use crate::types::ProductId;

/// Selected product ids in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<ProductId>,
}

impl SelectionSet {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from ids, keeping the first occurrence of each.
    pub fn from_ids(ids: impl IntoIterator<Item = ProductId>) -> Self {
        let mut selection = Self::new();
        for id in ids {
            selection.insert(id);
        }
        selection
    }

    /// Appends `id` unless it is already selected. Returns true if it was added.
    pub fn insert(&mut self, id: ProductId) -> bool {
        if self.contains(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Removes `id`. Returns true if it was selected.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| *existing != id);
        self.ids.len() != before
    }

    /// Removes `id` if selected, otherwise appends it. Returns true if `id`
    /// is selected afterwards.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Empties the selection.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Returns true if `id` is selected.
    pub fn contains(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in insertion order.
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
