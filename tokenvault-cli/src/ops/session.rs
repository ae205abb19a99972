//! Session commands: login, token, decode, logout.

use reqwest::Method;
use serde_json::Value;
use tokenvault_core::{
    AccessClaims, AccessTokenResponse, DecodeRequest, LoginRequest, RefreshTokenRequest,
    RefreshTokenResponse,
};

use super::ui::{done, field, heading, tip};
use super::{print_message, print_output, OutputFormat};
use crate::client::ApiClient;

pub async fn login(
    client: &ApiClient,
    email: &str,
    password: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let req = LoginRequest {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    };
    let resp: RefreshTokenResponse = client.call(Method::POST, "/login", &req).await?;
    print_output(&resp, output, |resp| {
        done("logged in");
        field("Refresh Token", &resp.refresh_token);
        println!();
        tip("exchange it for an access token with `tokenvault-cli token <refresh-token>`");
    })
}

pub async fn token(
    client: &ApiClient,
    refresh_token: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let req = RefreshTokenRequest {
        refresh_token: Some(refresh_token.to_string()),
    };
    let resp: AccessTokenResponse = client.call(Method::POST, "/token", &req).await?;
    print_output(&resp, output, |resp| {
        done("access token issued");
        field("Access Token", &resp.access_token);
    })
}

pub async fn decode(
    client: &ApiClient,
    access_token: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let req = DecodeRequest {
        access_token: Some(access_token.to_string()),
    };
    let claims: AccessClaims = client.call(Method::POST, "/decode", &req).await?;
    print_output(&claims, output, |claims| {
        heading("Access token claims");
        field("User ID", &claims.user_id);
        field("Email", &claims.email);
        field("Name", &format!("{} {}", claims.name, claims.last_name));
        field("Expires", &claims.exp.to_string());
    })
}

pub async fn logout(
    client: &ApiClient,
    refresh_token: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let req = RefreshTokenRequest {
        refresh_token: Some(refresh_token.to_string()),
    };
    let resp: Value = client.call(Method::DELETE, "/logout", &req).await?;
    print_message(&resp, output)
}

pub async fn logout_all(
    client: &ApiClient,
    email: &str,
    password: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let req = LoginRequest {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    };
    let resp: Value = client.call(Method::DELETE, "/logoutAll", &req).await?;
    print_message(&resp, output)
}
