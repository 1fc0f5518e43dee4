//! Display metadata for categories and priority tiers.
//!
//! The built-in tables carry the restaurant's Bengali labels. A JSON file
//! with the same shape can add categories or override any entry:
//!
//! ```json
//! {
//!   "categories": { "tea": { "icon": "fas fa-mug-hot", "name": "চা" } },
//!   "badges": { "high": { "label": "Chef's pick", "icon": "fas fa-star" } }
//! }
//! ```

use std::{collections::HashMap, fs::read_to_string, path::Path};

use menu_adapters::Priority;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ConfigError;

/// Icon used when neither the backend nor the table knows a category.
pub const FALLBACK_ICON: &str = "fas fa-utensils";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDisplay {
    pub icon: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBadge {
    pub label: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DisplayTables {
    #[serde(default)]
    categories: HashMap<String, CategoryDisplay>,
    /// Keyed by priority key (`most_selling`, `high`, ...).
    #[serde(default)]
    badges: HashMap<String, PriorityBadge>,
}

impl DisplayTables {
    pub fn builtin() -> Self {
        let categories = [
            ("drinks", "fas fa-coffee", "পানীয়"),
            ("burger", "fas fa-hamburger", "বার্গার"),
            ("pizza", "fas fa-pizza-slice", "পিজা"),
            ("rice", "fas fa-bowl-rice", "ভাত"),
            ("chicken", "fas fa-drumstick-bite", "চিকেন"),
            ("beef", "fas fa-hamburger", "গরুর মাংস"),
            ("fish", "fas fa-fish", "মাছ"),
            ("vegetable", "fas fa-carrot", "সবজি"),
            ("dessert", "fas fa-ice-cream", "মিষ্টি"),
            ("snacks", "fas fa-cookie-bite", "নাস্তা"),
            ("noodles", "fas fa-utensils", "নুডলস"),
        ]
        .into_iter()
        .map(|(key, icon, name)| {
            (
                key.to_string(),
                CategoryDisplay {
                    icon: icon.to_string(),
                    name: name.to_string(),
                },
            )
        })
        .collect();

        let badges = [
            (Priority::MostSelling, "Top Selling", "fas fa-fire"),
            (Priority::High, "Popular", "fas fa-star"),
        ]
        .into_iter()
        .map(|(priority, label, icon)| {
            (
                priority.as_str().to_string(),
                PriorityBadge {
                    label: label.to_string(),
                    icon: icon.to_string(),
                },
            )
        })
        .collect();

        Self { categories, badges }
    }

    /// Built-in tables, extended by the file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut tables = Self::builtin();
        let Some(path) = path else {
            return Ok(tables);
        };

        let unreadable = |reason: String| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason,
        };
        let raw = read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        let overrides: DisplayTables =
            serde_json::from_str(&raw).map_err(|e| unreadable(e.to_string()))?;

        info!(
            categories = overrides.categories.len(),
            badges = overrides.badges.len(),
            "Loaded display table overrides from {}",
            path.display()
        );
        tables.merge(overrides);
        Ok(tables)
    }

    pub fn merge(&mut self, other: DisplayTables) {
        self.categories.extend(
            other
                .categories
                .into_iter()
                .map(|(key, display)| (key.to_lowercase(), display)),
        );
        self.badges.extend(other.badges);
    }

    pub fn category(&self, key: &str) -> Option<&CategoryDisplay> {
        self.categories.get(&key.to_lowercase())
    }

    /// Display name for a category key, or the key itself when unknown.
    pub fn category_name(&self, key: &str) -> String {
        self.category(key)
            .map(|display| display.name.clone())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn badge(&self, priority: Priority) -> Option<&PriorityBadge> {
        self.badges.get(priority.as_str())
    }
}
