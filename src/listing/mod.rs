//! Entity list/detail view state.
//!
//! - `window`: trailing-day and week filters, recomputed per call
//! - `hierarchy`: parent/child ordering with a separator before independents
//! - [`ListState`]: the in-memory list patched after successful writes

pub mod hierarchy;
pub mod window;

pub use hierarchy::{order_hierarchy, HierarchyRow, Parented};
pub use window::{week_start, TimeWindow};

use crate::models::Identified;

/// Locally held rows for one list view.
///
/// Callers patch it only after the matching write has succeeded, so it
/// never shows a row the store rejected.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    items: Vec<T>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified + Clone> ListState<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// New rows go to the top of the list.
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Swap in a fresh copy of one row. Returns false when the id is not listed.
    pub fn replace(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        let pos = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(pos))
    }

    /// Replace everything after a full reload.
    pub fn reset(&mut self, items: Vec<T>) {
        self.items = items;
    }
}
