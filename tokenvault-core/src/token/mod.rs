//! The two halves of the trust core: stateless access tokens and
//! registry-backed refresh tokens. They are signed with distinct secrets.

mod access;
mod refresh;

pub use access::{AccessClaims, AccessTokenCodec, INVALID_ACCESS_TOKEN};
pub use refresh::{RefreshClaims, RefreshTokenRegistry, ValidatedRefresh};
