//! Accounts: data model, credential checks and the operations behind each endpoint.

mod auth;
mod crypto;
mod manager;
mod models;
mod password;

pub use manager::AccountManager;
pub use models::{
    AccessTokenResponse, Account, AccountSummary, ChangePasswordRequest, DecodeRequest,
    LoginRequest, NewAccount, RefreshTokenRequest, RefreshTokenResponse, RegisterRequest,
    UpdateProfileRequest,
};
