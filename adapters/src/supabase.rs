//! Supabase-specific adapter implementation for the menu database.
//!
//! This file contains the concrete implementation of the `MenuAdapter` trait
//! for a Supabase project, talking to its PostgREST interface over HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::errors::AdapterError;
use crate::models::{Category, MenuItem, OrderRecord};
use crate::MenuAdapter;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CATEGORY_ORDER: &str = "sort_order.asc.nullslast,created_at.asc";

/// Names of the tables the ordering page reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub products: String,
    pub orders: String,
    pub categories: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            products: "products".to_string(),
            orders: "orders".to_string(),
            categories: "categories".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub tables: TableNames,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .field("tables", &self.tables)
            .finish()
    }
}

pub struct SupabaseAdapter {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseAdapter {
    pub fn new(config: SupabaseConfig) -> Result<Self, AdapterError> {
        if config.url.trim().is_empty() {
            return Err(AdapterError::InvalidConfiguration(
                "Supabase URL is empty".to_string(),
            ));
        }
        if config.anon_key.trim().is_empty() {
            return Err(AdapterError::InvalidConfiguration(
                "Supabase anon key is empty".to_string(),
            ));
        }

        let key = HeaderValue::from_str(config.anon_key.trim())
            .map_err(|err| AdapterError::InvalidConfiguration(format!("anon key: {err}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.anon_key.trim()))
            .map_err(|err| AdapterError::InvalidConfiguration(format!("anon key: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("apikey"), key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AdapterError::Connection(format!("Cannot build HTTP client: {err}")))?;

        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn items_url(&self) -> String {
        format!("{}?select=*", self.table_url(&self.config.tables.products))
    }

    fn categories_url(&self) -> String {
        format!(
            "{}?select=*&order={}",
            self.table_url(&self.config.tables.categories),
            CATEGORY_ORDER
        )
    }

    fn orders_url(&self) -> String {
        self.table_url(&self.config.tables.orders)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AdapterError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Supabase request failed with {status}: {body}");
            return Err(AdapterError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| AdapterError::Decode(err.to_string()))
    }
}

#[async_trait]
impl MenuAdapter for SupabaseAdapter {
    async fn fetch_items(&self) -> Result<Vec<MenuItem>, AdapterError> {
        let response = self.client.get(self.items_url()).send().await?;
        let items: Vec<MenuItem> = Self::read_json(response).await?;
        debug!("Fetched {} products", items.len());
        Ok(items)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, AdapterError> {
        let response = self.client.get(self.categories_url()).send().await?;
        let categories: Vec<Category> = Self::read_json(response).await?;
        debug!("Fetched {} categories", categories.len());
        Ok(categories)
    }

    async fn insert_order(&self, order: &OrderRecord) -> Result<OrderRecord, AdapterError> {
        let response = self
            .client
            .post(self.orders_url())
            .header("Prefer", "return=representation")
            .json(&[order])
            .send()
            .await?;

        let mut rows: Vec<OrderRecord> = Self::read_json(response).await?;
        if rows.is_empty() {
            return Err(AdapterError::Decode(
                "insert returned no representation".to_string(),
            ));
        }
        Ok(rows.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, key: &str) -> SupabaseConfig {
        SupabaseConfig {
            url: url.to_string(),
            anon_key: key.to_string(),
            tables: TableNames::default(),
        }
    }

    #[test]
    fn rejects_missing_credentials() {
        assert!(matches!(
            SupabaseAdapter::new(config("", "key")),
            Err(AdapterError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SupabaseAdapter::new(config("https://demo.supabase.co", "  ")),
            Err(AdapterError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn builds_rest_urls() {
        let adapter = SupabaseAdapter::new(config("https://demo.supabase.co/", "anon")).unwrap();
        assert_eq!(
            adapter.items_url(),
            "https://demo.supabase.co/rest/v1/products?select=*"
        );
        assert_eq!(
            adapter.categories_url(),
            "https://demo.supabase.co/rest/v1/categories?select=*&order=sort_order.asc.nullslast,created_at.asc"
        );
        assert_eq!(adapter.orders_url(), "https://demo.supabase.co/rest/v1/orders");
    }

    #[test]
    fn custom_table_names_are_used() {
        let mut cfg = config("https://demo.supabase.co", "anon");
        cfg.tables.products = "menu_items".to_string();
        let adapter = SupabaseAdapter::new(cfg).unwrap();
        assert!(adapter.items_url().ends_with("/rest/v1/menu_items?select=*"));
    }

    #[test]
    fn debug_output_hides_key() {
        let rendered = format!("{:?}", config("https://demo.supabase.co", "secret-key"));
        assert!(!rendered.contains("secret-key"));
    }
}
