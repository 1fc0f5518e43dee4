//! Catalog Store: every menu item, loaded once and sorted for display.
//!
//! Items are ordered by priority rank ascending, newest first within a rank.
//! That order is fixed at load time and every projection preserves it.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use menu_adapters::{AdapterError, ItemId, MenuAdapter, MenuItem};
use thiserror::Error;
use tracing::{info, warn};

use super::category_index::CategoryIndex;
use crate::config::DisplayTables;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to load menu items: {0}")]
    CatalogLoadFailed(#[source] AdapterError),

    /// Never surfaced to the page; the category index falls back to the
    /// categories found on the loaded items.
    #[error("failed to load categories: {0}")]
    CategoryLoadFailed(#[source] AdapterError),
}

pub fn compare_items(a: &MenuItem, b: &MenuItem) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Stable sort by [`compare_items`].
pub fn sort_items(items: &mut [Arc<MenuItem>]) {
    items.sort_by(|a, b| compare_items(a, b));
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Arc<MenuItem>>,
    by_id: HashMap<ItemId, usize>,
    categories: CategoryIndex,
    load_failed: bool,
}

impl Catalog {
    /// Fetches items, then builds the category index against them.
    pub async fn load(
        adapter: &dyn MenuAdapter,
        tables: &DisplayTables,
    ) -> Result<Self, CatalogError> {
        let fetched = adapter
            .fetch_items()
            .await
            .map_err(CatalogError::CatalogLoadFailed)?;

        let items = Self::prepare_items(fetched);
        let categories = CategoryIndex::build(adapter, &items, tables).await;

        let catalog = Self::new(items, categories);
        info!(
            items = catalog.len(),
            categories = catalog.categories().len(),
            "Catalog loaded"
        );
        if catalog.is_empty() {
            warn!("Catalog has no menu items to show");
        } else if catalog.categories().is_empty() {
            warn!("Catalog items carry no categories");
        }
        Ok(catalog)
    }

    /// Empty catalog standing in for one whose item fetch failed.
    pub fn failed() -> Self {
        Self {
            load_failed: true,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn from_items(items: Vec<MenuItem>, categories: CategoryIndex) -> Self {
        Self::new(Self::prepare_items(items), categories)
    }

    fn new(items: Vec<Arc<MenuItem>>, categories: CategoryIndex) -> Self {
        let by_id = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id, index))
            .collect();
        Self {
            items,
            by_id,
            categories,
            load_failed: false,
        }
    }

    /// Drops rows with an unusable price and applies the display order. Rows
    /// without a creation time are kept and sort last within their priority.
    fn prepare_items(fetched: Vec<MenuItem>) -> Vec<Arc<MenuItem>> {
        let mut items: Vec<Arc<MenuItem>> = fetched
            .into_iter()
            .filter(|item| {
                let valid = item.has_valid_price();
                if !valid {
                    warn!(item_id = %item.id, price = item.price, "Skipping item with invalid price");
                }
                valid
            })
            .inspect(|item| {
                if !item.has_created_at() {
                    warn!(item_id = %item.id, "Item has no creation time, listing it as oldest");
                }
            })
            .map(Arc::new)
            .collect();
        sort_items(&mut items);
        items
    }

    pub fn items(&self) -> &[Arc<MenuItem>] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Arc<MenuItem>> {
        self.by_id.get(&id).map(|&index| &self.items[index])
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }
}
