//! Category Index: the ordered list of categories offered for navigation.
//!
//! When the backend returns categories, their admin-curated order is used as
//! is, including categories that currently have no items. Otherwise the index
//! is derived from the categories present on the loaded items, sorted
//! alphabetically.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use menu_adapters::{Category, IconType, MenuAdapter, MenuItem};
use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::CatalogError;
use crate::config::{DisplayTables, FALLBACK_ICON};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CategoryIcon {
    Image(String),
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub key: String,
    pub name: String,
    pub icon: CategoryIcon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    Backend,
    #[default]
    Derived,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    entries: Vec<CategoryEntry>,
    source: CategorySource,
}

impl CategoryIndex {
    pub async fn build(
        adapter: &dyn MenuAdapter,
        items: &[Arc<MenuItem>],
        tables: &DisplayTables,
    ) -> Self {
        match adapter.fetch_categories().await {
            Ok(categories) if !categories.is_empty() => Self::from_backend(&categories, tables),
            Ok(_) => {
                warn!("No categories returned by backend, deriving from items");
                Self::derive(items, tables)
            }
            Err(err) => {
                let err = CatalogError::CategoryLoadFailed(err);
                warn!(error = %err, "Falling back to item categories");
                Self::derive(items, tables)
            }
        }
    }

    /// Keeps the backend order; a key repeated with different casing keeps
    /// its first position.
    pub fn from_backend(categories: &[Category], tables: &DisplayTables) -> Self {
        let mut seen = HashSet::new();
        let entries = categories
            .iter()
            .filter(|category| seen.insert(category.key.to_lowercase()))
            .map(|category| resolve_entry(&category.key.to_lowercase(), Some(category), tables))
            .collect();

        Self {
            entries,
            source: CategorySource::Backend,
        }
    }

    pub fn derive(items: &[Arc<MenuItem>], tables: &DisplayTables) -> Self {
        let keys: BTreeSet<String> = items
            .iter()
            .map(|item| item.category_key())
            .filter(|key| !key.is_empty())
            .collect();
        debug!(?keys, "Derived categories from items");

        Self {
            entries: keys
                .iter()
                .map(|key| resolve_entry(key, None, tables))
                .collect(),
            source: CategorySource::Derived,
        }
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.key.as_str()).collect()
    }

    pub fn source(&self) -> CategorySource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Icon: backend reference, else the display table, else the generic icon.
/// Name: backend name, else the display table, else the raw key.
pub fn resolve_entry(key: &str, category: Option<&Category>, tables: &DisplayTables) -> CategoryEntry {
    let builtin = tables.category(key);

    let backend_icon = category.and_then(|category| {
        let icon = category.icon.as_deref().map(str::trim).filter(|icon| !icon.is_empty())?;
        Some(match category.icon_type {
            IconType::Image => CategoryIcon::Image(icon.to_string()),
            IconType::Icon => CategoryIcon::Symbol(icon.to_string()),
        })
    });
    let icon = backend_icon.unwrap_or_else(|| {
        CategoryIcon::Symbol(
            builtin
                .map(|display| display.icon.clone())
                .unwrap_or_else(|| FALLBACK_ICON.to_string()),
        )
    });

    let name = category
        .map(|category| category.name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| builtin.map(|display| display.name.clone()))
        .unwrap_or_else(|| key.to_string());

    CategoryEntry {
        key: key.to_string(),
        name,
        icon,
    }
}
