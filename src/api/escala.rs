use crate::api::error::ApiError;
use crate::api::{parse_body, run_blocking};
use crate::app::AppState;
use crate::calendar::CalendarView;
use crate::models::{ScheduleRow, SuccessResponse, ToggleDayPayload};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    pub month: Option<String>,
    #[serde(rename = "type")]
    pub variant: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub month: Option<String>,
    pub mat: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
    #[serde(rename = "type")]
    pub variant: Option<String>,
    pub mat: Option<String>,
    pub mode: Option<String>,
}

/// `null` when the month has never been written.
pub(crate) async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Option<Vec<ScheduleRow>>>, ApiError> {
    let rows = run_blocking(state.service, move |service| {
        service.get_schedule(query.month.as_deref(), query.variant.as_deref())
    })
    .await?;
    Ok(Json(rows))
}

pub(crate) async fn save_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError> {
    let payload: Value = parse_body(&body)?;
    let response = run_blocking(state.service, move |service| {
        service.save_schedule(query.month.as_deref(), query.variant.as_deref(), payload)
    })
    .await?;
    Ok(Json(response))
}

pub(crate) async fn delete_schedule(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let response = run_blocking(state.service, move |service| {
        service.delete_assignments(
            query.month.as_deref(),
            query.mat.as_deref(),
            query.scope.as_deref(),
        )
    })
    .await?;
    Ok(Json(response))
}

pub(crate) async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarView>, ApiError> {
    let view = run_blocking(state.service, move |service| {
        service.calendar(
            query.month.as_deref(),
            query.variant.as_deref(),
            query.mat.as_deref(),
            query.mode.as_deref(),
        )
    })
    .await?;
    Ok(Json(view))
}

pub(crate) async fn toggle_day(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScheduleRow>, ApiError> {
    let payload: ToggleDayPayload = parse_body(&body)?;
    let updated = run_blocking(state.service, move |service| service.toggle_day(payload)).await?;
    Ok(Json(updated))
}
