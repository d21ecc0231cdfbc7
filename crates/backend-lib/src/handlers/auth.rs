// ============================
// clawcontrol-backend-lib/src/handlers/auth.rs
// ============================
//! Auth endpoints. These are thin adapters: the header convention and
//! status codes live here, the semantics live in [`crate::auth`].
use crate::error::AppError;
use crate::handlers::bearer_token;
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use clawcontrol_common::api::{
    LoginRequest, LoginResponse, RecoveryRequest, RecoveryResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest, ResetPasswordResponse, UpdateUserRequest, UserProfile,
};
use std::sync::Arc;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let resp = state
        .auth
        .register(&req.email, &req.name, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let resp = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(resp))
}

/// Idempotent: logging out an unknown or absent token is a no-op.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    if let Some(token) = bearer_token(&headers) {
        state.auth.logout(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Returns `null` rather than 401 for a missing/expired token, matching
/// the query shape the dashboard expects.
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Option<UserProfile>>, AppError> {
    let profile = state.auth.me(bearer_token(&headers)).await?;
    Ok(Json(profile))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateUserRequest>,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    state.auth.update_user(token, req.name.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn request_recovery(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecoveryRequest>,
) -> Result<Json<RecoveryResponse>, AppError> {
    let resp = state.auth.request_recovery(&req.email).await?;
    Ok(Json(resp))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, AppError> {
    let resp = state
        .auth
        .reset_password(&req.recovery_token, &req.new_password)
        .await?;
    Ok(Json(resp))
}
