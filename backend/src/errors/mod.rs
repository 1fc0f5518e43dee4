//! Global application error types and handlers.
//!
//! This module defines the error type returned by every API handler and turns
//! it into a consistent response: an HTTP status plus a JSON body carrying the
//! technical message and a localized notice for the page to display.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use menu_adapters::ItemId;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::services::catalog::CatalogError;
use crate::services::notice::{MessageKey, Notice, Notices};
use crate::services::order_submitter::OrderError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Unknown menu item {0}")]
    UnknownItem(ItemId),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Order(OrderError::EmptyCart | OrderError::MissingTableNumber) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Order(OrderError::SubmissionInFlight) => StatusCode::CONFLICT,
            AppError::Order(OrderError::SubmissionFailed(_)) => StatusCode::BAD_GATEWAY,
            AppError::Order(OrderError::TotalMismatch { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Catalog(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SessionNotFound(_) | AppError::UnknownItem(_) => StatusCode::NOT_FOUND,
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message_key(&self) -> MessageKey {
        match self {
            AppError::Order(OrderError::EmptyCart) => MessageKey::NothingSelected,
            AppError::Order(OrderError::MissingTableNumber) => MessageKey::SelectTable,
            AppError::Order(OrderError::SubmissionInFlight) => MessageKey::SubmissionInFlight,
            AppError::Order(OrderError::SubmissionFailed(_) | OrderError::TotalMismatch { .. }) => {
                MessageKey::OrderFailed
            }
            AppError::Catalog(_) => MessageKey::CatalogLoadFailed,
            AppError::SessionNotFound(_) => MessageKey::SessionExpired,
            AppError::UnknownItem(_) => MessageKey::ItemUnavailable,
            AppError::MalformedPayload(_) => MessageKey::BadRequest,
        }
    }
}

/// An [`AppError`] paired with the notice the page should show for it.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub notice: Notice,
}

impl Notices {
    pub fn reject(&self, error: impl Into<AppError>) -> ApiError {
        let error = error.into();
        let notice = self.error(error.message_key());
        ApiError { error, notice }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let body = json!({
            "error": self.error.to_string(),
            "notice": self.notice,
        });

        (status, Json(body)).into_response()
    }
}
