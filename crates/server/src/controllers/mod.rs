//! HTTP-shaped adapters between the path router and the application services.

pub mod about_us_controller;
pub mod service_controller;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::DataEnvelope;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ApiError;
use crate::router::{PathParam, RouteParams};

pub use about_us_controller::AboutUsController;
pub use service_controller::ServiceController;

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i32,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(DataEnvelope { data }).into_response()
}

pub fn created(id: i32, message: &'static str) -> Response {
    (StatusCode::CREATED, Json(DataEnvelope { data: Created { id, message } })).into_response()
}

pub fn message(message: &'static str) -> Response {
    ok(Message { message })
}

/// The `{id}` capture. `Ok(None)` is an integer no row can carry.
pub fn id_param(params: &RouteParams) -> Result<Option<i32>, ApiError> {
    match params.get("id") {
        Some(PathParam::Integer(n)) => Ok(i32::try_from(*n).ok()),
        _ => Err(ApiError::bad_request("Invalid id")),
    }
}

/// `None` when the body is not JSON or does not fit `T`.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    serde_json::from_slice(body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Input {
        name: Option<String>,
    }

    #[test]
    fn body_presence_requires_non_null_strings() {
        assert_eq!(parse_body::<Input>(br#"{"name":"x"}"#).and_then(|i| i.name).as_deref(), Some("x"));
        assert_eq!(parse_body::<Input>(br#"{"name":""}"#).and_then(|i| i.name).as_deref(), Some(""));
        assert!(parse_body::<Input>(br#"{"name":null}"#).and_then(|i| i.name).is_none());
        assert!(parse_body::<Input>(br#"{}"#).and_then(|i| i.name).is_none());
        assert!(parse_body::<Input>(br#"{"name":5}"#).is_none());
        assert!(parse_body::<Input>(b"name=x").is_none());
        assert!(parse_body::<Input>(b"").is_none());
    }
}
