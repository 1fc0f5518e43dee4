//! Central module for organizing the application's main API endpoints.
//!
//! This module holds the shared application state and assembles the menu and
//! session routers into the service's router.

pub mod menu;
pub mod session;

use std::sync::Arc;

use axum::{routing::get, Router};
use menu_adapters::MenuAdapter;
use tokio::sync::{Mutex, RwLock};
use tracing::error;
use uuid::Uuid;

use crate::config::{Config, DisplayTables};
use crate::errors::{ApiError, AppError};
use crate::middleware::{cors_layer, trace_layer};
use crate::services::catalog::{Catalog, CatalogError};
use crate::services::notice::Notices;
use crate::services::presenter::PLACEHOLDER_IMAGE_PATH;
use crate::services::session::{Session, SessionRegistry};
use crate::services::table::TableContext;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub adapter: Arc<dyn MenuAdapter>,
    pub tables: DisplayTables,
    pub notices: Notices,
    pub sessions: SessionRegistry,
    catalog: RwLock<Arc<Catalog>>,
}

impl AppState {
    /// Loads the catalog once. A failed load leaves an empty catalog flagged
    /// as failed so the page can show its empty state.
    pub async fn new(config: Config, adapter: Arc<dyn MenuAdapter>, tables: DisplayTables) -> SharedState {
        let catalog = match Catalog::load(adapter.as_ref(), &tables).await {
            Ok(catalog) => catalog,
            Err(err) => {
                error!(error = %err, "Error loading products");
                Catalog::failed()
            }
        };

        Arc::new(Self {
            notices: Notices::new(config.locale, config.notice_duration),
            sessions: SessionRegistry::new(config.session_idle),
            catalog: RwLock::new(Arc::new(catalog)),
            config,
            adapter,
            tables,
        })
    }

    pub async fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&*self.catalog.read().await)
    }

    /// Re-fetches the catalog. On failure the current one stays in place.
    pub async fn reload_catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        let catalog = Arc::new(Catalog::load(self.adapter.as_ref(), &self.tables).await?);
        *self.catalog.write().await = Arc::clone(&catalog);
        Ok(catalog)
    }

    pub async fn open_session(&self, table_param: Option<&str>) -> Arc<Mutex<Session>> {
        let table = TableContext::detect(table_param, self.config.max_tables);
        let (_, session) = self
            .sessions
            .open(Session::new(table, Arc::clone(&self.adapter)))
            .await;
        session
    }

    pub async fn session(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, ApiError> {
        self.sessions
            .get(id)
            .await
            .ok_or_else(|| self.reject(AppError::SessionNotFound(id)))
    }

    pub fn reject(&self, error: impl Into<AppError>) -> ApiError {
        self.notices.reject(error)
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route(PLACEHOLDER_IMAGE_PATH, get(menu::handlers::placeholder_image))
        .nest("/api/menu", menu::routes::menu_router())
        .nest("/api/sessions", session::routes::session_router())
        .layer(cors_layer())
        .layer(trace_layer())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Table menu ordering service"
}
