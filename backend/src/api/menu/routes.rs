//! Defines the HTTP routes for the shared menu catalog.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{list_categories, reload_catalog};
use crate::api::SharedState;

pub fn menu_router() -> Router<SharedState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/reload", post(reload_catalog))
}
