use crate::api::error::ApiError;
use crate::api::{parse_body, run_blocking};
use crate::app::AppState;
use crate::models::{LogEntry, SuccessResponse};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub month: Option<String>,
}

pub(crate) async fn get_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    let entries = run_blocking(state.service, move |service| service.get_logs(query.month.as_deref())).await?;
    Ok(Json(entries))
}

pub(crate) async fn save_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError> {
    let payload: Value = parse_body(&body)?;
    let response = run_blocking(state.service, move |service| {
        service.save_logs(query.month.as_deref(), payload)
    })
    .await?;
    Ok(Json(response))
}
