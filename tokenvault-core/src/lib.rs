//! Core library for account credentials and token lifecycle: field validation,
//! credential checks, access-token signing, the refresh-token registry and the
//! account store gateway.

pub mod account;
mod config;
mod error;
pub mod store;
pub mod token;
pub mod validation;

pub use account::{
    AccessTokenResponse, Account, AccountManager, AccountSummary, ChangePasswordRequest,
    DecodeRequest, LoginRequest, NewAccount, RefreshTokenRequest, RefreshTokenResponse,
    RegisterRequest, UpdateProfileRequest,
};
pub use config::{AuthConfig, MAX_ACCESS_TOKEN_TTL};
pub use error::{AuthError, Result};
pub use store::{AccountStore, AccountUpdate, FileStore, MemoryStore};
pub use token::{AccessClaims, AccessTokenCodec, RefreshClaims, RefreshTokenRegistry};
