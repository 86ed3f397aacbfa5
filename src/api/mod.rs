//! HTTP handlers for the roster service.
//!
//! Handlers stay thin: decode the request, run the matching
//! [`RosterService`] operation on the blocking pool, and encode the result.
pub mod accounts;
pub mod error;
pub mod escala;
pub mod logs;
pub mod system;

use crate::api::error::{api_internal, api_validation_error, ApiError};
use crate::errors::AppResult;
use crate::service::RosterService;
use axum::body::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Runs a document operation off the async runtime. A panicking operation is
/// reported as an internal error.
pub(crate) async fn run_blocking<T, F>(service: Arc<RosterService>, operation: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&RosterService) -> AppResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || operation(&service))
        .await
        .map_err(|error| api_internal(&error))?
        .map_err(ApiError::from)
}

/// Decodes a JSON request body. Anything unparseable is a 400.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(api_validation_error("request body is required"));
    }
    serde_json::from_slice(body)
        .map_err(|error| api_validation_error(&format!("invalid request body: {}", error)))
}
