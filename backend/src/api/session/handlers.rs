//! Handler functions for the session API.
//!
//! Handlers lock the session only for the duration of a synchronous state
//! change; order placement releases it while the backend insert is awaited.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{stream, Stream};
use menu_adapters::{ItemId, OrderRecord};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::SharedState;
use crate::errors::{ApiError, AppError};
use crate::services::cart::{QuantityChange, ToggleOutcome};
use crate::services::notice::{MessageKey, Notice};
use crate::services::order_submitter::OrderForm;
use crate::services::presenter::{
    cart_badge, menu_view, table_section, CartBadge, MenuView, OrderSummary, TableSection,
};
use crate::services::session;

#[derive(Debug, Deserialize)]
pub struct OpenSessionParams {
    pub table: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OpenSessionResponse {
    pub session_id: Uuid,
    pub table: TableSection,
    pub badge: CartBadge,
}

#[derive(Debug, Deserialize)]
pub struct MenuParams {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub item_id: ItemId,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub selected: bool,
    pub summary: OrderSummary,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub item_id: ItemId,
    pub change: QuantityChange,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: OrderRecord,
    pub notice: Notice,
}

fn payload<T>(state: &SharedState, body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| state.reject(AppError::MalformedPayload(rejection.body_text())))
}

pub async fn open_session(
    State(state): State<SharedState>,
    Query(params): Query<OpenSessionParams>,
) -> (StatusCode, Json<OpenSessionResponse>) {
    let session = state.open_session(params.table.as_deref()).await;
    let session = session.lock().await;

    (
        StatusCode::CREATED,
        Json(OpenSessionResponse {
            session_id: session.id,
            table: table_section(&session.table, &session.form),
            badge: cart_badge(&session.cart),
        }),
    )
}

pub async fn get_menu(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(params): Query<MenuParams>,
) -> Result<Json<MenuView>, ApiError> {
    let session = state.session(id).await?;
    let catalog = state.catalog().await;
    let mut session = session.lock().await;

    if let Some(category) = params.category.as_deref() {
        session.view.set_category(category);
    }
    if let Some(search) = params.q.as_deref() {
        session.view.set_search(search);
    }

    Ok(Json(menu_view(
        &catalog,
        &session.view,
        &session.cart,
        &state.tables,
        &state.notices,
    )))
}

pub async fn get_cart(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderSummary>, ApiError> {
    let session = state.session(id).await?;
    let session = session.lock().await;
    Ok(Json(session.summary()))
}

pub async fn toggle_item(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let request = payload(&state, body)?;
    let session = state.session(id).await?;
    let catalog = state.catalog().await;
    let mut session = session.lock().await;

    let outcome = session
        .toggle(&catalog, request.item_id)
        .map_err(|err| state.reject(err))?;
    let selected = match outcome {
        ToggleOutcome::Added => true,
        ToggleOutcome::Removed => false,
        ToggleOutcome::UnknownItem => {
            return Err(state.reject(AppError::UnknownItem(request.item_id)))
        }
    };

    Ok(Json(ToggleResponse {
        selected,
        summary: session.summary(),
    }))
}

pub async fn change_quantity(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    body: Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Json<OrderSummary>, ApiError> {
    let request = payload(&state, body)?;
    let session = state.session(id).await?;
    let mut session = session.lock().await;

    session
        .change_quantity(request.item_id, request.change)
        .map_err(|err| state.reject(err))?;
    Ok(Json(session.summary()))
}

/// Server-sent events carrying the cart snapshot: the current one first, then
/// one per change. The stream ends when the session is evicted.
pub async fn cart_events(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let session = state.session(id).await?;
    let receiver = session.lock().await.cart.subscribe();

    let events = stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first {
            receiver.changed().await.ok()?;
        }
        let snapshot = receiver.borrow_and_update().clone();
        Some((
            Event::default().event("cart").json_data(&snapshot),
            (receiver, false),
        ))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub async fn place_order(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    body: Result<Json<OrderForm>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let form = payload(&state, body)?;
    let session = state.session(id).await?;

    let order = session::submit(&session, form)
        .await
        .map_err(|err| state.reject(err))?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            order,
            notice: state.notices.success(MessageKey::OrderPlaced),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, Bytes};
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use futures::{Stream, StreamExt};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::tests::{seeded_adapter, send, test_app};
    use axum::Router;

    async fn open(app: &Router, query: &str) -> (String, Value) {
        let (status, body) = send(app, "POST", &format!("/api/sessions{query}"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        (body["session_id"].as_str().unwrap().to_string(), body)
    }

    /// Reads one `cart` event off an SSE body and returns its JSON payload.
    async fn next_cart_event<S>(events: &mut S) -> Value
    where
        S: Stream<Item = Result<Bytes, axum::Error>> + Unpin,
    {
        let mut buffer = String::new();
        loop {
            let chunk = tokio::time::timeout(Duration::from_secs(2), events.next())
                .await
                .expect("no cart event within 2s")
                .expect("event stream ended")
                .unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());

            if let Some(end) = buffer.find("\n\n") {
                let frame = &buffer[..end];
                assert!(frame.lines().any(|line| line.starts_with("event:") && line.ends_with("cart")));
                let data = frame
                    .lines()
                    .find_map(|line| line.strip_prefix("data:"))
                    .unwrap();
                return serde_json::from_str(data.trim_start()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn cart_events_send_current_snapshot_then_changes() {
        let (_, app) = test_app(seeded_adapter()).await;
        let (id, _) = open(&app, "?table=2").await;

        let request = Request::builder()
            .uri(format!("/api/sessions/{id}/cart/events"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
        let mut events = response.into_body().into_data_stream();

        let current = next_cart_event(&mut events).await;
        assert_eq!(current["item_count"], 0);
        assert_eq!(current["lines"].as_array().unwrap().len(), 0);

        send(&app, "POST", &format!("/api/sessions/{id}/cart/toggle"), Some(json!({ "item_id": 1 }))).await;
        let changed = next_cart_event(&mut events).await;
        assert_eq!(changed["item_count"], 1);
        assert_eq!(changed["lines"][0]["item_id"], 1);
        assert_eq!(changed["total"], 100.0);
    }

    #[tokio::test]
    async fn table_param_pins_or_falls_back_to_selector() {
        let (_, app) = test_app(seeded_adapter()).await;

        let (_, pinned) = open(&app, "?table=5").await;
        assert_eq!(pinned["table"]["mode"], "pinned");
        assert_eq!(pinned["table"]["table_number"], 5);

        let (_, manual) = open(&app, "?table=99").await;
        assert_eq!(manual["table"]["mode"], "selector");
        assert_eq!(manual["table"]["options"].as_array().unwrap().len(), 20);
        assert_eq!(manual["badge"]["show_order_button"], false);
    }

    #[tokio::test]
    async fn menu_view_keeps_category_while_searching() {
        let (_, app) = test_app(seeded_adapter()).await;
        let (id, _) = open(&app, "").await;

        let (_, all) = send(&app, "GET", &format!("/api/sessions/{id}/menu"), None).await;
        let names: Vec<_> = all["cards"].as_array().unwrap().iter().map(|c| c["name"].clone()).collect();
        assert_eq!(names[0], "Beef Burger");
        assert_eq!(all["cards"][0]["badge"]["label"], "Top Selling");
        assert_eq!(names.len(), 3);

        let (_, burgers) =
            send(&app, "GET", &format!("/api/sessions/{id}/menu?category=burger"), None).await;
        assert_eq!(burgers["cards"].as_array().unwrap().len(), 2);

        let (_, searched) = send(&app, "GET", &format!("/api/sessions/{id}/menu?q=lemon"), None).await;
        assert_eq!(searched["category"], "burger");
        assert_eq!(searched["empty"], true);
    }

    #[tokio::test]
    async fn cart_flow_updates_summary() {
        let (_, app) = test_app(seeded_adapter()).await;
        let (id, _) = open(&app, "?table=3").await;

        let (status, toggled) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/cart/toggle"),
            Some(json!({ "item_id": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["selected"], true);

        send(&app, "POST", &format!("/api/sessions/{id}/cart/toggle"), Some(json!({ "item_id": 2 }))).await;
        let (_, summary) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/cart/quantity"),
            Some(json!({ "item_id": 1, "change": "increment" })),
        )
        .await;
        assert_eq!(summary["total"], 250.0);
        assert_eq!(summary["item_count"], 3);
        assert_eq!(summary["badge"]["show_order_button"], true);

        let (_, menu) = send(&app, "GET", &format!("/api/sessions/{id}/menu"), None).await;
        let selected: Vec<_> = menu["cards"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["selected"] == true)
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(selected, [1, 2]);
    }

    #[tokio::test]
    async fn unknown_item_and_session_are_rejected() {
        let (_, app) = test_app(seeded_adapter()).await;
        let (id, _) = open(&app, "").await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/cart/toggle"),
            Some(json!({ "item_id": 404 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["notice"]["message"], "This item is no longer available.");

        let (status, _) = send(
            &app,
            "GET",
            "/api/sessions/00000000-0000-0000-0000-000000000000/cart",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/cart/quantity"),
            Some(json!({ "item_id": 1, "change": "double" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_cart_order_is_refused_without_backend_call() {
        let adapter = seeded_adapter();
        let (_, app) = test_app(adapter.clone()).await;
        let (id, _) = open(&app, "?table=2").await;

        let (status, body) =
            send(&app, "POST", &format!("/api/sessions/{id}/orders"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notice"]["kind"], "error");
        assert_eq!(adapter.insert_calls().await, 0);
    }

    #[tokio::test]
    async fn manual_table_is_required_without_param() {
        let (_, app) = test_app(seeded_adapter()).await;
        let (id, _) = open(&app, "").await;
        send(&app, "POST", &format!("/api/sessions/{id}/cart/toggle"), Some(json!({ "item_id": 3 }))).await;

        let (status, body) =
            send(&app, "POST", &format!("/api/sessions/{id}/orders"), Some(json!({ "customer_name": "Rina" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["notice"]["message"], "Please select your table number.");

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/orders"),
            Some(json!({ "customer_name": "Rina", "table_number": 12 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["order"]["table_number"], 12);
        assert_eq!(body["order"]["customer_name"], "Rina");
    }

    #[tokio::test]
    async fn successful_order_clears_cart_and_keeps_table() {
        let adapter = seeded_adapter();
        let (_, app) = test_app(adapter.clone()).await;
        let (id, _) = open(&app, "?table=7").await;
        send(&app, "POST", &format!("/api/sessions/{id}/cart/toggle"), Some(json!({ "item_id": 2 }))).await;

        let (status, body) =
            send(&app, "POST", &format!("/api/sessions/{id}/orders"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["order"]["status"], "pending");
        assert_eq!(body["order"]["total_price"], 50.0);
        assert_eq!(body["notice"]["kind"], "success");

        let (_, cart) = send(&app, "GET", &format!("/api/sessions/{id}/cart"), None).await;
        assert_eq!(cart["item_count"], 0);
        assert_eq!(cart["table"]["table_number"], 7);
        assert_eq!(adapter.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn backend_failure_is_retryable() {
        let adapter = seeded_adapter();
        let (_, app) = test_app(adapter.clone()).await;
        let (id, _) = open(&app, "?table=1").await;
        send(&app, "POST", &format!("/api/sessions/{id}/cart/toggle"), Some(json!({ "item_id": 1 }))).await;

        adapter.set_orders_available(false).await;
        let (status, body) =
            send(&app, "POST", &format!("/api/sessions/{id}/orders"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["notice"]["dismiss_after_secs"], 5);

        let (_, cart) = send(&app, "GET", &format!("/api/sessions/{id}/cart"), None).await;
        assert_eq!(cart["item_count"], 1);

        adapter.set_orders_available(true).await;
        let (status, _) =
            send(&app, "POST", &format!("/api/sessions/{id}/orders"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn double_submit_is_refused_while_in_flight() {
        let adapter = seeded_adapter();
        adapter.set_insert_delay(Some(Duration::from_millis(100))).await;
        let (state, app) = test_app(adapter.clone()).await;
        let (id, _) = open(&app, "?table=4").await;
        send(&app, "POST", &format!("/api/sessions/{id}/cart/toggle"), Some(json!({ "item_id": 1 }))).await;

        let first = tokio::spawn({
            let app = app.clone();
            let uri = format!("/api/sessions/{id}/orders");
            async move { send(&app, "POST", &uri, Some(json!({}))).await }
        });

        let session = state.session(id.parse().unwrap()).await.unwrap();
        while !session.lock().await.is_submitting() {
            tokio::task::yield_now().await;
        }

        let (status, _) =
            send(&app, "POST", &format!("/api/sessions/{id}/orders"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/cart/toggle"),
            Some(json!({ "item_id": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (_, cart) = send(&app, "GET", &format!("/api/sessions/{id}/cart"), None).await;
        assert_eq!(cart["submitting"], true);

        let (status, _) = first.await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(adapter.orders().await.len(), 1);

        let (_, cart) = send(&app, "GET", &format!("/api/sessions/{id}/cart"), None).await;
        assert_eq!(cart["item_count"], 0);
        assert_eq!(cart["submitting"], false);
    }
}
