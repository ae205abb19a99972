//! Session endpoints: login, access-token minting, decode and logout.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::Value;
use tokenvault_core::validation::validate_login;
use tokenvault_core::{
    AccessClaims, AccessTokenResponse, DecodeRequest, LoginRequest, RefreshTokenRequest,
    RefreshTokenResponse,
};

use super::super::error::ApiError;
use super::super::extract::{bearer_token, ValidJson};
use super::super::state::AppState;
use super::message;

/// POST /login - mint a refresh token for valid credentials
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<(StatusCode, Json<RefreshTokenResponse>), ApiError> {
    let credentials = validate_login(&req)?;
    let refresh_token = state.accounts.login(&credentials).await?;
    Ok((
        StatusCode::CREATED,
        Json(RefreshTokenResponse { refresh_token }),
    ))
}

/// POST /token - exchange a refresh token for an access token
pub async fn token(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshTokenRequest>,
) -> Result<(StatusCode, Json<AccessTokenResponse>), ApiError> {
    let access_token = state
        .accounts
        .access_token(req.refresh_token.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(AccessTokenResponse { access_token })))
}

/// POST /decode - verify an access token and echo its claims.
///
/// The token comes from the `accessToken` body field or, failing that, a
/// bearer header. Any problem, including an unreadable body, is a 401.
pub async fn decode(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AccessClaims>, ApiError> {
    let from_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<DecodeRequest>(&body)
            .ok()
            .and_then(|req| req.access_token)
    };
    let token = from_body.or_else(|| bearer_token(&headers));
    let claims = state.accounts.decode_access_token(token.as_deref())?;
    Ok(Json(claims))
}

/// DELETE /logout - revoke the presented refresh token
pub async fn logout(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshTokenRequest>,
) -> Result<Json<Value>, ApiError> {
    state.accounts.logout(req.refresh_token.as_deref()).await?;
    Ok(message(
        "You have been logged out, that refresh token will no longer be valid",
    ))
}

/// DELETE /logoutAll - revoke every refresh token of the account
pub async fn logout_all(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let credentials = validate_login(&req)?;
    state.accounts.logout_all(&credentials).await?;
    Ok(message("All refresh tokens have been invalidated"))
}
