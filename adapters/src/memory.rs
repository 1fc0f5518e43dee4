//! In-memory adapter implementation.
//!
//! Holds items, categories and inserted orders in process memory. Each of the
//! three backend calls can be switched off to simulate an unreachable
//! database, and order inserts can be delayed to keep a submission in flight.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::errors::AdapterError;
use crate::models::{compare_categories, Category, MenuItem, OrderId, OrderRecord};
use crate::MenuAdapter;

/// Initial contents of an [`InMemoryAdapter`], as read from a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub products: Vec<MenuItem>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<MenuItem>,
    categories: Vec<Category>,
    orders: Vec<OrderRecord>,
    next_order_id: i64,
    items_down: bool,
    categories_down: bool,
    orders_down: bool,
    insert_delay: Option<Duration>,
    insert_calls: usize,
}

#[derive(Debug)]
pub struct InMemoryAdapter {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryAdapter {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl InMemoryAdapter {
    pub fn new(items: Vec<MenuItem>, categories: Vec<Category>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                items,
                categories,
                next_order_id: 1,
                ..MemoryState::default()
            }),
        }
    }

    pub fn from_seed(seed: Seed) -> Self {
        Self::new(seed.products, seed.categories)
    }

    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, AdapterError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
            AdapterError::InvalidConfiguration(format!("Cannot read seed {}: {err}", path.display()))
        })?;
        let seed: Seed =
            serde_json::from_str(&raw).map_err(|err| AdapterError::Decode(err.to_string()))?;
        info!(
            "Seeded in-memory menu with {} products and {} categories",
            seed.products.len(),
            seed.categories.len()
        );
        Ok(Self::from_seed(seed))
    }

    pub async fn set_items_available(&self, available: bool) {
        self.state.lock().await.items_down = !available;
    }

    pub async fn set_categories_available(&self, available: bool) {
        self.state.lock().await.categories_down = !available;
    }

    pub async fn set_orders_available(&self, available: bool) {
        self.state.lock().await.orders_down = !available;
    }

    pub async fn set_insert_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.insert_delay = delay;
    }

    pub async fn replace_items(&self, items: Vec<MenuItem>) {
        self.state.lock().await.items = items;
    }

    /// Orders stored so far, in insertion order.
    pub async fn orders(&self) -> Vec<OrderRecord> {
        self.state.lock().await.orders.clone()
    }

    /// Number of `insert_order` calls, including failed ones.
    pub async fn insert_calls(&self) -> usize {
        self.state.lock().await.insert_calls
    }
}

#[async_trait]
impl MenuAdapter for InMemoryAdapter {
    async fn fetch_items(&self) -> Result<Vec<MenuItem>, AdapterError> {
        let state = self.state.lock().await;
        if state.items_down {
            return Err(AdapterError::Unavailable("products".to_string()));
        }
        Ok(state.items.clone())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, AdapterError> {
        let state = self.state.lock().await;
        if state.categories_down {
            return Err(AdapterError::Unavailable("categories".to_string()));
        }
        let mut categories = state.categories.clone();
        categories.sort_by(compare_categories);
        Ok(categories)
    }

    async fn insert_order(&self, order: &OrderRecord) -> Result<OrderRecord, AdapterError> {
        let delay = {
            let mut state = self.state.lock().await;
            state.insert_calls += 1;
            state.insert_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        if state.orders_down {
            return Err(AdapterError::Unavailable("orders".to_string()));
        }

        let mut stored = order.clone();
        stored.id = Some(OrderId::Number(state.next_order_id));
        state.next_order_id += 1;
        state.orders.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IconType, ItemId, OrderStatus, Priority};
    use chrono::{TimeZone, Utc};

    fn item(id: i64) -> MenuItem {
        MenuItem {
            id: ItemId(id),
            name: format!("item {id}"),
            price: 10.0,
            category: "snacks".to_string(),
            priority: Priority::Low,
            image_url: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn order() -> OrderRecord {
        OrderRecord {
            id: None,
            products: Vec::new(),
            total_price: 0.0,
            table_number: 1,
            customer_name: None,
            status: OrderStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn switched_off_calls_fail() {
        let adapter = InMemoryAdapter::new(vec![item(1)], Vec::new());
        adapter.set_items_available(false).await;
        assert!(matches!(
            adapter.fetch_items().await,
            Err(AdapterError::Unavailable(_))
        ));

        adapter.set_items_available(true).await;
        assert_eq!(adapter.fetch_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn categories_come_back_sorted() {
        let cat = |key: &str, sort_order| Category {
            key: key.to_string(),
            name: key.to_string(),
            icon: None,
            icon_type: IconType::Icon,
            sort_order,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };
        let adapter = InMemoryAdapter::new(Vec::new(), vec![cat("b", None), cat("a", Some(3))]);
        let keys: Vec<_> = adapter
            .fetch_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let adapter = InMemoryAdapter::default();
        let first = adapter.insert_order(&order()).await.unwrap();
        let second = adapter.insert_order(&order()).await.unwrap();
        assert_eq!(first.id, Some(OrderId::Number(1)));
        assert_eq!(second.id, Some(OrderId::Number(2)));
        assert_eq!(adapter.orders().await.len(), 2);
    }

    #[tokio::test]
    async fn failed_insert_is_counted_but_not_stored() {
        let adapter = InMemoryAdapter::default();
        adapter.set_orders_available(false).await;
        assert!(adapter.insert_order(&order()).await.is_err());
        assert_eq!(adapter.insert_calls().await, 1);
        assert!(adapter.orders().await.is_empty());
    }

    #[test]
    fn seed_parses_products_and_categories() {
        let raw = r#"{
            "products": [{"id":1,"name":"Tea","price":20,"category":"drinks","created_at":"2025-01-01T00:00:00Z"}],
            "categories": [{"key":"drinks","name":"Drinks","created_at":"2025-01-01T00:00:00Z"}]
        }"#;
        let seed: Seed = serde_json::from_str(raw).unwrap();
        assert_eq!(seed.products.len(), 1);
        assert_eq!(seed.categories[0].key, "drinks");
    }
}
