//! Filter/View Projector.

use std::sync::Arc;

use menu_adapters::MenuItem;

/// Category key that matches every item.
pub const ALL_CATEGORIES: &str = "all";

/// Category and search text the page is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub category: String,
    pub search: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            search: String::new(),
        }
    }
}

impl ViewState {
    pub fn set_category(&mut self, category: &str) {
        let category = category.trim();
        self.category = if category.is_empty() {
            ALL_CATEGORIES.to_string()
        } else {
            category.to_lowercase()
        };
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
    }

    pub fn project<'a>(&self, items: &'a [Arc<MenuItem>]) -> Vec<&'a Arc<MenuItem>> {
        project(items, &self.category, Some(&self.search))
    }
}

pub fn matches_category(item: &MenuItem, category: &str) -> bool {
    category.eq_ignore_ascii_case(ALL_CATEGORIES) || item.category_key() == category.to_lowercase()
}

/// Items visible for `category` and `search`, in catalog order. A search never
/// widens the result beyond the selected category.
pub fn project<'a>(
    items: &'a [Arc<MenuItem>],
    category: &str,
    search: Option<&str>,
) -> Vec<&'a Arc<MenuItem>> {
    let needle = search.filter(|term| !term.is_empty()).map(str::to_lowercase);

    items
        .iter()
        .filter(|item| matches_category(item, category))
        .filter(|item| match &needle {
            Some(needle) => item.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect()
}
