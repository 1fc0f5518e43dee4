//! Generic data models for the `adapters` crate.
//!
//! These models define the menu, category and order rows as the hosted
//! database stores them, so every adapter implementation hands the backend
//! service the same shapes regardless of where the data came from.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stable identifier of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Merchandising tier of a menu item. Unknown or missing values read as `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    MostSelling,
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    pub fn from_key(key: &str) -> Self {
        match key {
            "most_selling" => Priority::MostSelling,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }

    /// Sort rank, lower first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::MostSelling => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::MostSelling => "most_selling",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = Option::<String>::deserialize(deserializer)?;
        Ok(key.as_deref().map(Priority::from_key).unwrap_or_default())
    }
}

/// A row of the products table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    /// Category key; empty when the row has none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub image_url: Option<String>,
    /// [`MISSING_TIMESTAMP`] when the row has none, which sorts it as oldest.
    #[serde(default = "missing_timestamp", deserialize_with = "null_as_missing")]
    pub created_at: DateTime<Utc>,
}

/// Stand-in creation time for rows stored without one.
pub const MISSING_TIMESTAMP: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

impl MenuItem {
    /// Lowercased category key used for matching against the category index.
    pub fn category_key(&self) -> String {
        self.category.to_lowercase()
    }

    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }

    pub fn has_created_at(&self) -> bool {
        self.created_at != MISSING_TIMESTAMP
    }
}

/// How a category's `icon` field should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconType {
    /// A symbolic icon name (CSS icon class).
    #[default]
    Icon,
    /// An image URL.
    Image,
}

impl<'de> Deserialize<'de> for IconType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = Option::<String>::deserialize(deserializer)?;
        Ok(match key.as_deref() {
            Some("image") => IconType::Image,
            _ => IconType::Icon,
        })
    }
}

/// A row of the categories table, curated by the restaurant admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_type: IconType,
    #[serde(default)]
    pub sort_order: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Orders categories by `sort_order` ascending with unset values last, then
/// by creation time ascending.
pub fn compare_categories(a: &Category, b: &Category) -> Ordering {
    let by_sort_order = match (a.sort_order, b.sort_order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_sort_order.then_with(|| a.created_at.cmp(&b.created_at))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Delivered,
    Completed,
}

/// Backend-assigned order identifier. The hosted schema may use either a
/// serial or a uuid primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderId {
    Number(i64),
    Text(String),
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderId::Number(n) => write!(f, "{n}"),
            OrderId::Text(s) => f.write_str(s),
        }
    }
}

/// Snapshot of one ordered item, detached from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A row of the orders table. Written once by the ordering page and never
/// updated by it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub products: Vec<OrderLine>,
    pub total_price: f64,
    pub table_number: u32,
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn missing_timestamp() -> DateTime<Utc> {
    MISSING_TIMESTAMP
}

fn null_as_missing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or(MISSING_TIMESTAMP))
}
