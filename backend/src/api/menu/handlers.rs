//! Handler functions for the menu API.

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::api::SharedState;
use crate::errors::ApiError;
use crate::services::category_index::CategorySource;
use crate::services::presenter::{category_nav, CategoryNav, PLACEHOLDER_SVG};

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub source: CategorySource,
    #[serde(flatten)]
    pub nav: CategoryNav,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub items: usize,
    pub categories: usize,
}

pub async fn list_categories(State(state): State<SharedState>) -> Json<CategoriesResponse> {
    let catalog = state.catalog().await;
    Json(CategoriesResponse {
        source: catalog.categories().source(),
        nav: category_nav(&catalog),
    })
}

pub async fn reload_catalog(State(state): State<SharedState>) -> Result<Json<ReloadResponse>, ApiError> {
    let catalog = state.reload_catalog().await.map_err(|err| state.reject(err))?;
    info!(items = catalog.len(), "Catalog reloaded");
    Ok(Json(ReloadResponse {
        items: catalog.len(),
        categories: catalog.categories().len(),
    }))
}

pub async fn placeholder_image() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/svg+xml")], PLACEHOLDER_SVG)
}
