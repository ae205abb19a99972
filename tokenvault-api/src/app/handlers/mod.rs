mod account;
mod auth;
mod health;

pub use account::{change_password, delete_account, register, update_profile};
pub use auth::{decode, login, logout, logout_all, token};
pub use health::{handler_404, health};

use axum::Json;
use serde_json::{json, Value};

/// Plain confirmation body for mutations that return no data.
fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}
