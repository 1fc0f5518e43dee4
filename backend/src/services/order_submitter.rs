//! Order Submitter: validates the cart and table, snapshots the lines, and
//! persists the order through the backend adapter.
//!
//! Submission is split in two phases so a caller can release its lock on the
//! cart while the backend call is awaited:
//!
//! 1. [`OrderSubmitter::prepare`] validates and builds the [`OrderRecord`],
//!    and claims the in-flight flag. The returned [`SubmissionTicket`]
//!    releases the flag when dropped.
//! 2. [`OrderSubmitter::persist`] performs the insert.
//!
//! While a ticket is alive every further `prepare` fails with
//! [`OrderError::SubmissionInFlight`], so a double click cannot create two
//! orders. The caller keeps the ticket until it has settled the cart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use menu_adapters::{AdapterError, MenuAdapter, OrderLine, OrderRecord, OrderStatus};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use super::cart::SelectionCart;
use super::table::TableContext;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("no table number available")]
    MissingTableNumber,

    #[error("an order is already being submitted")]
    SubmissionInFlight,

    #[error("order total {computed} does not match cart total {expected}")]
    TotalMismatch { computed: f64, expected: f64 },

    #[error("order submission failed: {0}")]
    SubmissionFailed(#[from] AdapterError),
}

/// Fields of the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Manual selector value; ignored when the table was auto-detected.
    #[serde(default)]
    pub table_number: Option<u32>,
}

impl OrderForm {
    pub fn customer_name(&self) -> Option<String> {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A validated order holding the session's in-flight flag.
#[derive(Debug)]
pub struct SubmissionTicket {
    order: OrderRecord,
    in_flight: Arc<AtomicBool>,
}

impl SubmissionTicket {
    pub fn order(&self) -> &OrderRecord {
        &self.order
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct OrderSubmitter {
    adapter: Arc<dyn MenuAdapter>,
    in_flight: Arc<AtomicBool>,
}

impl std::fmt::Debug for OrderSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSubmitter")
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

impl OrderSubmitter {
    pub fn new(adapter: Arc<dyn MenuAdapter>) -> Self {
        Self {
            adapter,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn prepare(
        &self,
        cart: &SelectionCart,
        table: &TableContext,
        form: &OrderForm,
    ) -> Result<SubmissionTicket, OrderError> {
        if self.is_in_flight() {
            return Err(OrderError::SubmissionInFlight);
        }
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let table_number = table
            .resolve(form.table_number)
            .ok_or(OrderError::MissingTableNumber)?;

        let order = build_order(cart, table_number, form.customer_name(), Utc::now())?;

        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OrderError::SubmissionInFlight)?;

        Ok(SubmissionTicket {
            order,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Inserts the ticket's order. The in-flight flag stays set until the
    /// ticket is dropped.
    pub async fn persist(&self, ticket: &SubmissionTicket) -> Result<OrderRecord, OrderError> {
        match self.adapter.insert_order(ticket.order()).await {
            Ok(record) => {
                info!(
                    order_id = ?record.id,
                    table = record.table_number,
                    total = record.total_price,
                    lines = record.products.len(),
                    "Order placed"
                );
                Ok(record)
            }
            Err(err) => {
                error!(error = %err, "Error placing order");
                Err(OrderError::SubmissionFailed(err))
            }
        }
    }
}

/// Snapshots the cart into a pending order. The lines are detached copies, so
/// later catalog changes cannot alter the order.
pub fn build_order(
    cart: &SelectionCart,
    table_number: u32,
    customer_name: Option<String>,
    now: DateTime<Utc>,
) -> Result<OrderRecord, OrderError> {
    let products: Vec<OrderLine> = cart
        .lines()
        .iter()
        .map(|line| OrderLine {
            id: line.item.id,
            name: line.item.name.clone(),
            price: line.item.price,
            quantity: line.quantity,
        })
        .collect();

    let computed: f64 = products.iter().map(OrderLine::line_total).sum();
    let expected = cart.total();
    if computed != expected {
        return Err(OrderError::TotalMismatch { computed, expected });
    }

    Ok(OrderRecord {
        id: None,
        products,
        total_price: computed,
        table_number,
        customer_name,
        status: OrderStatus::Pending,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::cart::QuantityChange;
    use crate::services::catalog::tests::item;
    use crate::services::catalog::Catalog;
    use crate::services::category_index::CategoryIndex;
    use menu_adapters::{InMemoryAdapter, ItemId, OrderId};

    fn catalog() -> Catalog {
        Catalog::from_items(
            vec![
                item(1, "Beef Burger", 100.0, "burger"),
                item(2, "Lemonade", 50.0, "drinks"),
            ],
            CategoryIndex::default(),
        )
    }

    fn filled_cart(catalog: &Catalog) -> SelectionCart {
        let mut cart = SelectionCart::new();
        cart.toggle(catalog, ItemId(1));
        cart.toggle(catalog, ItemId(2));
        cart.set_quantity(ItemId(1), QuantityChange::Increment);
        cart
    }

    fn submitter() -> (Arc<InMemoryAdapter>, OrderSubmitter) {
        let adapter = Arc::new(InMemoryAdapter::default());
        let submitter = OrderSubmitter::new(adapter.clone());
        (adapter, submitter)
    }

    #[tokio::test]
    async fn empty_cart_never_reaches_backend() {
        let (adapter, submitter) = submitter();
        let cart = SelectionCart::new();
        let table = TableContext::detect(Some("3"), 20);

        let err = submitter
            .prepare(&cart, &table, &OrderForm::default())
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
        assert!(!submitter.is_in_flight());
        assert_eq!(adapter.insert_calls().await, 0);
    }

    #[tokio::test]
    async fn missing_table_is_rejected() {
        let (adapter, submitter) = submitter();
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let table = TableContext::detect(Some("99"), 20);

        let err = submitter
            .prepare(&cart, &table, &OrderForm::default())
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingTableNumber));
        assert!(!submitter.is_in_flight());
        assert_eq!(adapter.insert_calls().await, 0);
    }

    #[tokio::test]
    async fn persisted_order_is_pending_with_form_details() {
        let (adapter, submitter) = submitter();
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let table = TableContext::detect(None, 20);
        let form = OrderForm {
            customer_name: Some("  Rahim ".to_string()),
            table_number: Some(7),
        };

        let ticket = submitter.prepare(&cart, &table, &form).unwrap();
        let record = submitter.persist(&ticket).await.unwrap();

        assert_eq!(record.status, OrderStatus::Pending);
        assert_eq!(record.id, Some(OrderId::Number(1)));
        assert_eq!(record.table_number, 7);
        assert_eq!(record.customer_name.as_deref(), Some("Rahim"));
        assert_eq!(record.total_price, 250.0);
        assert_eq!(record.products.len(), 2);
        assert_eq!(record.products[0].quantity, 2);
        assert_eq!(adapter.orders().await.len(), 1);

        assert!(submitter.is_in_flight());
        drop(ticket);
        assert!(!submitter.is_in_flight());
    }

    #[test]
    fn auto_detected_table_wins_over_manual_choice() {
        let (_, submitter) = submitter();
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let table = TableContext::detect(Some("4"), 20);
        let form = OrderForm {
            customer_name: Some("   ".to_string()),
            table_number: Some(11),
        };

        let ticket = submitter.prepare(&cart, &table, &form).unwrap();
        assert_eq!(ticket.order().table_number, 4);
        assert_eq!(ticket.order().customer_name, None);
        assert_eq!(table.auto_detected(), Some(4));
    }

    #[tokio::test]
    async fn backend_failure_is_retryable() {
        let (adapter, submitter) = submitter();
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let table = TableContext::detect(Some("2"), 20);
        let form = OrderForm::default();

        adapter.set_orders_available(false).await;
        let ticket = submitter.prepare(&cart, &table, &form).unwrap();
        let err = submitter.persist(&ticket).await.unwrap_err();
        assert!(matches!(err, OrderError::SubmissionFailed(_)));
        drop(ticket);

        adapter.set_orders_available(true).await;
        let ticket = submitter.prepare(&cart, &table, &form).unwrap();
        submitter.persist(&ticket).await.unwrap();
        assert_eq!(adapter.orders().await.len(), 1);
        assert_eq!(adapter.insert_calls().await, 2);
    }

    #[tokio::test]
    async fn second_prepare_while_in_flight_is_refused() {
        let (adapter, submitter) = submitter();
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let table = TableContext::detect(Some("1"), 20);
        let form = OrderForm::default();
        adapter.set_insert_delay(Some(Duration::from_millis(50))).await;

        let ticket = submitter.prepare(&cart, &table, &form).unwrap();
        let in_flight = tokio::spawn({
            let submitter = submitter.clone();
            async move { submitter.persist(&ticket).await }
        });
        tokio::task::yield_now().await;

        assert!(matches!(
            submitter.prepare(&cart, &table, &form),
            Err(OrderError::SubmissionInFlight)
        ));

        in_flight.await.unwrap().unwrap();
        assert!(submitter.prepare(&cart, &table, &form).is_ok());
        assert_eq!(adapter.insert_calls().await, 1);
    }

    #[test]
    fn snapshots_are_detached_from_catalog() {
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let order = build_order(&cart, 3, None, Utc::now()).unwrap();
        drop(catalog);

        assert_eq!(order.products[0].name, "Beef Burger");
        assert_eq!(order.total_price, cart.total());
    }
}
