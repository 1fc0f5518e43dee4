//! Defines the HTTP routes scoped to a page session.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cart_events, change_quantity, get_cart, get_menu, open_session, place_order, toggle_item,
};
use crate::api::SharedState;

pub fn session_router() -> Router<SharedState> {
    Router::new()
        .route("/", post(open_session))
        .route("/:id/menu", get(get_menu))
        .route("/:id/cart", get(get_cart))
        .route("/:id/cart/toggle", post(toggle_item))
        .route("/:id/cart/quantity", post(change_quantity))
        .route("/:id/cart/events", get(cart_events))
        .route("/:id/orders", post(place_order))
}
