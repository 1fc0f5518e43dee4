//! Page sessions.
//!
//! A session is the explicitly owned state of one open ordering page: its
//! cart, the table context captured on load, the current view and form state,
//! and the submitter guarding against duplicate orders. Sessions are kept in
//! a registry and evicted after a period of inactivity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use menu_adapters::{ItemId, MenuAdapter, OrderRecord};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use super::cart::{QuantityChange, SelectionCart, ToggleOutcome};
use super::catalog::Catalog;
use super::filter::ViewState;
use super::order_submitter::{OrderError, OrderForm, OrderSubmitter};
use super::presenter::{order_summary, OrderSummary};
use super::table::TableContext;

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub cart: SelectionCart,
    pub table: TableContext,
    pub view: ViewState,
    pub form: OrderForm,
    submitter: OrderSubmitter,
}

impl Session {
    pub fn new(table: TableContext, adapter: Arc<dyn MenuAdapter>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cart: SelectionCart::new(),
            table,
            view: ViewState::default(),
            form: OrderForm::default(),
            submitter: OrderSubmitter::new(adapter),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitter.is_in_flight()
    }

    /// Cart edits are refused while an order is awaiting the backend, so the
    /// cart cleared on success holds exactly what was ordered.
    pub fn toggle(&mut self, catalog: &Catalog, id: ItemId) -> Result<ToggleOutcome, OrderError> {
        self.ensure_idle()?;
        Ok(self.cart.toggle(catalog, id))
    }

    pub fn change_quantity(
        &mut self,
        id: ItemId,
        change: QuantityChange,
    ) -> Result<Option<u32>, OrderError> {
        self.ensure_idle()?;
        Ok(self.cart.set_quantity(id, change))
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            submitting: self.is_submitting(),
            ..order_summary(&self.cart, &self.table, &self.form)
        }
    }

    fn ensure_idle(&self) -> Result<(), OrderError> {
        if self.is_submitting() {
            return Err(OrderError::SubmissionInFlight);
        }
        Ok(())
    }
}

/// Submits the session's cart with its table context and the given form.
///
/// The session lock is not held across the backend call. The submission
/// ticket is, until the cart has been cleared, so no edit or second order can
/// slip in between the insert and the clear. On success the cart and form are
/// reset and the table context is kept for the next order; on failure both
/// stay as they were for a retry.
pub async fn submit(session: &Mutex<Session>, form: OrderForm) -> Result<OrderRecord, OrderError> {
    let (ticket, submitter) = {
        let mut guard = session.lock().await;
        let session = &mut *guard;
        let ticket = session.submitter.prepare(&session.cart, &session.table, &form)?;
        session.form = form;
        (ticket, session.submitter.clone())
    };

    let result = submitter.persist(&ticket).await;

    let mut session = session.lock().await;
    if result.is_ok() {
        session.cart.clear();
        session.form.reset();
    }
    drop(ticket);
    result
}

struct SessionSlot {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionSlot>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn open(&self, session: Session) -> (Uuid, Arc<Mutex<Session>>) {
        let id = session.id;
        let session = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(
            id,
            SessionSlot {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );
        debug!(session_id = %id, "Session opened");
        (id, session)
    }

    /// Looks a session up and marks it as active.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.get_mut(&id)?;
        slot.last_seen = Instant::now();
        Some(Arc::clone(&slot.session))
    }

    /// Drops sessions idle for longer than the timeout, returning how many
    /// were removed.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, slot| {
            let keep = now.saturating_duration_since(slot.last_seen) <= self.idle_timeout;
            if !keep {
                debug!(session_id = %id, "Session evicted");
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}
