//! Account lifecycle endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tokenvault_core::validation::{
    validate_login, validate_password_change, validate_profile, validate_registration,
};
use tokenvault_core::{
    AccountSummary, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};

use super::super::error::ApiError;
use super::super::extract::ValidJson;
use super::super::state::AppState;
use super::message;

/// POST /register - create an account
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountSummary>), ApiError> {
    let registration = validate_registration(&req)?;
    let account = state.accounts.register(registration).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// PUT /update - change name and last name, authorized by a refresh token
pub async fn update_profile(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    let profile = validate_profile(&req)?;
    state
        .accounts
        .update_profile(profile, req.refresh_token.as_deref())
        .await?;
    Ok(message("The user info has been updated"))
}

/// PUT /changePassword
pub async fn change_password(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let (credentials, new_password) = validate_password_change(&req)?;
    state
        .accounts
        .change_password(&credentials, &new_password)
        .await?;
    Ok(message("The password has been changed"))
}

/// DELETE /delete
pub async fn delete_account(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let credentials = validate_login(&req)?;
    state.accounts.delete_account(&credentials).await?;
    Ok(message("The user has been deleted"))
}
