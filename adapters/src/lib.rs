//! Core `adapters` crate for abstracting the hosted menu database.
//!
//! This crate defines the `MenuAdapter` trait, which outlines the three calls
//! the ordering service makes against its backend, and provides the concrete
//! implementations: the Supabase REST adapter and an in-memory adapter.

use async_trait::async_trait;

pub mod errors;
pub mod memory;
pub mod models;
pub mod supabase;

pub use errors::AdapterError;
pub use memory::{InMemoryAdapter, Seed};
pub use models::*;
pub use supabase::{SupabaseAdapter, SupabaseConfig, TableNames};

/// Narrow query/insert interface over the menu database.
#[async_trait]
pub trait MenuAdapter: Send + Sync {
    /// Every menu item, unfiltered and unpaginated.
    async fn fetch_items(&self) -> Result<Vec<MenuItem>, AdapterError>;

    /// Every category ordered by `sort_order` ascending (unset last), then by
    /// creation time ascending.
    async fn fetch_categories(&self) -> Result<Vec<Category>, AdapterError>;

    /// Persists a new order and returns the stored row with backend-assigned
    /// fields filled in.
    async fn insert_order(&self, order: &OrderRecord) -> Result<OrderRecord, AdapterError>;
}
