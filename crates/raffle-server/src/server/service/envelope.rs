use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Payload for responses that carry no data. Serializes as `{}`.
#[derive(Serialize, Debug, Default, Clone, Copy)]
pub struct Empty {}

/// The JSON body shared by every response.
///
/// `status` mirrors the HTTP status as a string, `code` carries the error kind
/// (empty on success) and `message` a human readable description (empty on
/// success).
#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub status: String,
    pub code: &'static str,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16().to_string(),
            code: "",
            message: String::new(),
            data,
        }
    }
}

impl Envelope<Empty> {
    pub fn error(status: StatusCode, code: &'static str, message: String) -> Self {
        Self {
            status: status.as_u16().to_string(),
            code,
            message,
            data: Empty {},
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
