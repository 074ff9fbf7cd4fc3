//! Category reference data and the current selection.

use crate::selection::Selection;
use crate::source::FetchError;
use crate::types::{Category, CategoryId};

/// Load state of the category list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryState {
    #[default]
    NotLoaded,
    Loaded,
    Failed(FetchError),
}

/// Available categories plus the user's selection.
///
/// Selecting an id that is not (yet) in the directory is allowed: the
/// selection may be restored from a URL before the category list arrives.
#[derive(Debug, Clone, Default)]
pub struct CategoryDirectory {
    categories: Vec<Category>,
    selection: Selection,
    state: CategoryState,
}

impl CategoryDirectory {
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            selection: Selection::new(),
            state: CategoryState::Loaded,
        }
    }

    /// Replace the category list, keeping the selection.
    pub fn replace(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.state = CategoryState::Loaded;
    }

    /// Record a failed category fetch. Previously loaded categories are kept.
    pub fn mark_failed(&mut self, error: FetchError) {
        self.state = CategoryState::Failed(error);
    }

    #[must_use]
    pub const fn state(&self) -> &CategoryState {
        &self.state
    }

    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn name_of(&self, id: CategoryId) -> Option<&str> {
        self.get(id).map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Toggle `id` in the selection. Returns whether it is now selected.
    pub fn toggle(&mut self, id: CategoryId) -> bool {
        self.selection.toggle(id)
    }

    #[must_use]
    pub fn is_selected(&self, id: CategoryId) -> bool {
        self.selection.contains(id)
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Categories currently selected, in directory order.
    pub fn selected(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|c| self.selection.contains(c.id))
    }
}
