use crate::api::error::ApiError;
use crate::api::{parse_body, run_blocking};
use crate::app::AppState;
use crate::models::{
    ChangePasswordPayload, CreateUserPayload, LoginPayload, LoginResponse, PublicUser, SeedUsersPayload,
    SeedUsersResponse, SuccessResponse,
};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

pub(crate) async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<LoginResponse>, ApiError> {
    let payload: LoginPayload = parse_body(&body)?;
    let response = run_blocking(state.service, move |service| service.login(payload)).await?;
    Ok(Json(response))
}

pub(crate) async fn change_password(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError> {
    let payload: ChangePasswordPayload = parse_body(&body)?;
    let response = run_blocking(state.service, move |service| service.change_password(payload)).await?;
    Ok(Json(response))
}

pub(crate) async fn seed_users(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SeedUsersResponse>, ApiError> {
    let payload: SeedUsersPayload = parse_body(&body)?;
    let response = run_blocking(state.service, move |service| service.seed_users(payload)).await?;
    Ok(Json(response))
}

pub(crate) async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = run_blocking(state.service, |service| service.list_users()).await?;
    Ok(Json(users))
}

pub(crate) async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let payload: CreateUserPayload = parse_body(&body)?;
    let user = run_blocking(state.service, move |service| service.create_user(payload)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
