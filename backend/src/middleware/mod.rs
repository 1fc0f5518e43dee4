//! General-purpose middleware for the API.
//!
//! CORS for the ordering page and request tracing, applied to the whole
//! router.

use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, Method};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{HttpMakeClassifier, TraceLayer},
};

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

pub fn trace_layer() -> TraceLayer<HttpMakeClassifier> {
    TraceLayer::new_for_http()
}
