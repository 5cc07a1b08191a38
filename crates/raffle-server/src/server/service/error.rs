//! HTTP error mapping.
//!
//! [`ApiError`] wraps the library [`raffle::Error`] and adds request
//! validation failures. Every variant renders as the standard JSON envelope
//! with the error kind in `code`, so clients can tell a transient failure from
//! a permanent one without parsing `message`.

use crate::server::service::envelope::Envelope;
use crate::server::telemetry::increment_draw_errors;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Clone, thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Draw(#[from] raffle::Error),

    /// The request was malformed or exceeded configured limits.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("route not found")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        use raffle::Error as E;
        match self {
            Self::Draw(E::DrawNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Draw(E::DrawExhausted { .. }) => StatusCode::GONE,
            Self::Draw(E::StoreUnavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Draw(E::CatalogEmpty) => StatusCode::NOT_FOUND,
            Self::Draw(E::CatalogUnavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Draw(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Draw(err) => err.kind(),
            Self::InvalidRequest { .. } => "InvalidRequest",
            Self::RouteNotFound => "RouteNotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        increment_draw_errors(self.kind());

        let envelope = Envelope::error(status, self.kind(), self.to_string());
        (status, envelope).into_response()
    }
}
