//! Selection Cart: the customer's unsubmitted items and quantities.
//!
//! Every effective mutation publishes a fresh [`CartSnapshot`] on a watch
//! channel so views (badge, order button, summary) can re-render without the
//! cart knowing about them.

use std::sync::Arc;

use menu_adapters::{ItemId, MenuItem};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use super::catalog::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityChange {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    UnknownItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: Arc<MenuItem>,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.item.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotLine {
    pub item_id: ItemId,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub lines: Vec<SnapshotLine>,
    pub item_count: u32,
    pub total: f64,
}

#[derive(Debug)]
pub struct SelectionCart {
    lines: Vec<CartLine>,
    changes: watch::Sender<CartSnapshot>,
}

impl Default for SelectionCart {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionCart {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(CartSnapshot::default());
        Self {
            lines: Vec::new(),
            changes,
        }
    }

    /// Selection-changed signal; the receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.changes.subscribe()
    }

    /// Adds the item with quantity 1, or removes its line if already selected.
    pub fn toggle(&mut self, catalog: &Catalog, id: ItemId) -> ToggleOutcome {
        if let Some(index) = self.position(id) {
            self.lines.remove(index);
            debug!(item_id = %id, "Removed item from cart");
            self.publish();
            return ToggleOutcome::Removed;
        }

        let Some(item) = catalog.get(id) else {
            return ToggleOutcome::UnknownItem;
        };
        self.lines.push(CartLine {
            item: Arc::clone(item),
            quantity: 1,
        });
        debug!(item_id = %id, "Added item to cart");
        self.publish();
        ToggleOutcome::Added
    }

    /// Steps the quantity of an existing line, never below 1. Returns the new
    /// quantity, or `None` when the item is not in the cart.
    pub fn set_quantity(&mut self, id: ItemId, change: QuantityChange) -> Option<u32> {
        let index = self.position(id)?;
        let line = &mut self.lines[index];
        let updated = match change {
            QuantityChange::Increment => line.quantity.saturating_add(1),
            QuantityChange::Decrement => line.quantity.saturating_sub(1).max(1),
        };

        if updated != line.quantity {
            line.quantity = updated;
            self.publish();
        }
        Some(updated)
    }

    pub fn clear(&mut self) {
        if !self.lines.is_empty() {
            self.lines.clear();
            self.publish();
        }
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities, not the number of lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[cfg(test)]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.position(id).is_some()
    }

    #[cfg(test)]
    pub fn quantity_of(&self, id: ItemId) -> Option<u32> {
        self.position(id).map(|index| self.lines[index].quantity)
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self
                .lines
                .iter()
                .map(|line| SnapshotLine {
                    item_id: line.item.id,
                    name: line.item.name.clone(),
                    price: line.item.price,
                    quantity: line.quantity,
                    line_total: line.line_total(),
                })
                .collect(),
            item_count: self.item_count(),
            total: self.total(),
        }
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.lines.iter().position(|line| line.item.id == id)
    }

    fn publish(&self) {
        self.changes.send_replace(self.snapshot());
    }
}
