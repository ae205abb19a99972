//! Account commands: register, update, password change, delete.

use reqwest::Method;
use serde_json::Value;
use tokenvault_core::{
    AccountSummary, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};

use super::ui::{field, heading};
use super::{print_message, print_output, OutputFormat};
use crate::client::ApiClient;

pub async fn register(
    client: &ApiClient,
    req: RegisterRequest,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let account: AccountSummary = client.call(Method::POST, "/register", &req).await?;
    print_output(&account, output, |account| {
        heading("Account created");
        field("ID", &account.id);
        field("Name", &format!("{} {}", account.name, account.last_name));
        field("Email", &account.email);
        field("Created", &account.created_at.to_rfc3339());
    })
}

pub async fn update_profile(
    client: &ApiClient,
    req: UpdateProfileRequest,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let resp: Value = client.call(Method::PUT, "/update", &req).await?;
    print_message(&resp, output)
}

pub async fn change_password(
    client: &ApiClient,
    req: ChangePasswordRequest,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let resp: Value = client.call(Method::PUT, "/changePassword", &req).await?;
    print_message(&resp, output)
}

pub async fn delete_account(
    client: &ApiClient,
    email: &str,
    password: &str,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let req = LoginRequest {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    };
    let resp: Value = client.call(Method::DELETE, "/delete", &req).await?;
    print_message(&resp, output)
}
