//! Refresh-token registry.
//!
//! A refresh token carries no expiry. It is valid exactly while it sits in
//! its account's `refresh_tokens` allow-list: the signature only proves we
//! minted it, membership proves it has not been revoked.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::account::Account;
use crate::error::{AuthError, Result};
use crate::store::{position_of, AccountStore, AccountUpdate};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    pub user_id: String,
    pub email: String,
    /// Random id; keeps two tokens minted in the same second distinct.
    pub jti: String,
    pub iat: i64,
}

/// Outcome of a successful [`RefreshTokenRegistry::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedRefresh {
    pub email: String,
    pub token: String,
    /// The owning account as loaded during validation; reuse it downstream.
    pub account: Account,
}

pub struct RefreshTokenRegistry {
    store: Arc<dyn AccountStore>,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl RefreshTokenRegistry {
    pub fn new(store: Arc<dyn AccountStore>, secret: &str) -> Self {
        Self {
            store,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }

    /// Mint a token for `account` and append it to the allow-list.
    ///
    /// `account` is the record the caller authenticated against. The append
    /// is refused if its password or token generation has moved since.
    #[instrument(skip(self, account), fields(user_id = %account.id))]
    pub async fn issue(&self, account: &Account) -> Result<String> {
        let claims = RefreshClaims {
            user_id: account.id.clone(),
            email: account.email.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Token(e.to_string()))?;

        self.store
            .save(&account.id, AccountUpdate::push_token(account, token.clone()))
            .await?
            .ok_or(AuthError::AccountGone)?;
        info!("refresh token issued");
        Ok(token)
    }

    /// Decode without consulting the store.
    pub fn decode(&self, token: &str) -> Result<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "refresh token signature check failed");
                AuthError::InvalidSignature
            })
    }

    /// Full check: shape, signature, owning account, allow-list membership.
    pub async fn validate(&self, token: Option<&str>) -> Result<ValidatedRefresh> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MalformedToken("the refresh token is missing".into())),
        };
        let claims = self.decode(token)?;

        let account = self
            .store
            .find_by_email(&claims.email)
            .await?
            .ok_or(AuthError::AccountGone)?;

        if position_of(&account.refresh_tokens, token).is_none() {
            debug!(user_id = %account.id, "refresh token not in allow-list");
            return Err(AuthError::TokenRevoked);
        }

        Ok(ValidatedRefresh {
            email: claims.email,
            token: token.to_string(),
            account,
        })
    }

    /// Remove one token. Revoking a token that is already gone is a no-op.
    #[instrument(skip(self, account, token), fields(user_id = %account.id))]
    pub async fn revoke_one(&self, account: &Account, token: &str) -> Result<()> {
        self.store
            .save(&account.id, AccountUpdate::PullRefreshToken(token.to_string()))
            .await?;
        info!("refresh token revoked");
        Ok(())
    }

    #[instrument(skip(self, account), fields(user_id = %account.id))]
    pub async fn revoke_all(&self, account: &Account) -> Result<()> {
        self.store
            .save(&account.id, AccountUpdate::ClearRefreshTokens)
            .await?;
        info!("all refresh tokens revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use crate::store::MemoryStore;

    async fn setup() -> (Arc<MemoryStore>, RefreshTokenRegistry, Account) {
        let store = Arc::new(MemoryStore::new());
        let account = store
            .create(NewAccount {
                name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        let registry = RefreshTokenRegistry::new(store.clone(), "refresh-secret");
        (store, registry, account)
    }

    #[tokio::test]
    async fn issue_then_validate_round_trips() {
        let (_store, registry, account) = setup().await;
        let token = registry.issue(&account).await.unwrap();
        let validated = registry.validate(Some(&token)).await.unwrap();
        assert_eq!(validated.email, "ada@example.com");
        assert_eq!(validated.account.id, account.id);
        assert_eq!(validated.account.refresh_tokens, vec![token]);
    }

    #[tokio::test]
    async fn tokens_issued_together_are_distinct() {
        let (store, registry, account) = setup().await;
        let a = registry.issue(&account).await.unwrap();
        let b = registry.issue(&account).await.unwrap();
        assert_ne!(a, b);
        let loaded = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(loaded.refresh_tokens, vec![a, b]);
    }

    #[tokio::test]
    async fn missing_token_is_malformed() {
        let (_store, registry, _account) = setup().await;
        assert!(matches!(
            registry.validate(None).await.unwrap_err(),
            AuthError::MalformedToken(_)
        ));
        assert!(matches!(
            registry.validate(Some("")).await.unwrap_err(),
            AuthError::MalformedToken(_)
        ));
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_signature() {
        let (store, registry, account) = setup().await;
        let other = RefreshTokenRegistry::new(store, "other-secret");
        let token = other.issue(&account).await.unwrap();
        assert!(matches!(
            registry.validate(Some(&token)).await.unwrap_err(),
            AuthError::InvalidSignature
        ));
        assert!(matches!(
            registry.validate(Some("garbage")).await.unwrap_err(),
            AuthError::InvalidSignature
        ));
    }

    #[tokio::test]
    async fn revoked_token_is_rejected_and_revoke_is_idempotent() {
        let (_store, registry, account) = setup().await;
        let keep = registry.issue(&account).await.unwrap();
        let drop = registry.issue(&account).await.unwrap();

        registry.revoke_one(&account, &drop).await.unwrap();
        registry.revoke_one(&account, &drop).await.unwrap();

        assert!(matches!(
            registry.validate(Some(&drop)).await.unwrap_err(),
            AuthError::TokenRevoked
        ));
        assert!(registry.validate(Some(&keep)).await.is_ok());
    }

    #[tokio::test]
    async fn revoke_all_clears_every_token() {
        let (_store, registry, account) = setup().await;
        let mut tokens = Vec::new();
        for _ in 0..3 {
            tokens.push(registry.issue(&account).await.unwrap());
        }
        registry.revoke_all(&account).await.unwrap();
        for token in tokens {
            assert!(matches!(
                registry.validate(Some(&token)).await.unwrap_err(),
                AuthError::TokenRevoked
            ));
        }
    }

    #[tokio::test]
    async fn stale_account_cannot_issue_after_revoke_all() {
        let (store, registry, account) = setup().await;
        registry.revoke_all(&account).await.unwrap();

        let err = registry.issue(&account).await.unwrap_err();
        assert!(matches!(err, AuthError::CredentialsChanged));
        let loaded = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(loaded.refresh_tokens.is_empty());
        registry.issue(&loaded).await.unwrap();
    }

    #[tokio::test]
    async fn deleted_account_is_gone() {
        let (store, registry, account) = setup().await;
        let token = registry.issue(&account).await.unwrap();
        store.delete(&account.id).await.unwrap();
        assert!(matches!(
            registry.validate(Some(&token)).await.unwrap_err(),
            AuthError::AccountGone
        ));
    }
}
