//! Stateless access tokens: signed identity claims with a short expiry.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::Account;
use crate::error::{AuthError, Result};

/// Message returned for every rejected access token, whatever the cause.
pub const INVALID_ACCESS_TOKEN: &str = "invalid access token";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    /// Claims expiring `ttl_secs` from now. Fails instead of overflowing
    /// when the expiry is not a representable time.
    pub fn for_account(account: &Account, ttl_secs: i64) -> Result<Self> {
        let now = Utc::now();
        let exp = TimeDelta::try_seconds(ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::Token(format!("access token ttl of {ttl_secs}s is out of range"))
            })?;
        Ok(Self {
            user_id: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            last_name: account.last_name.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl AccessTokenCodec {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Sign a fresh token for `account`, expiring `ttl_secs` from now.
    pub fn issue(&self, account: &Account) -> Result<String> {
        self.sign(&AccessClaims::for_account(account, self.ttl_secs)?)
    }

    pub fn sign(&self, claims: &AccessClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Check signature and expiry. Expired, forged and malformed tokens all
    /// fail with the same `Unauthorized` error; the cause is only logged.
    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        decode::<AccessClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "access token rejected");
                AuthError::Unauthorized(INVALID_ACCESS_TOKEN.into())
            })
    }
}

impl std::fmt::Debug for AccessTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
