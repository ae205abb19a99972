//! Credential verification, login, access-token minting and logout.

use tracing::{info, instrument, warn};

use super::crypto::verify_password;
use super::models::*;
use super::AccountManager;
use crate::error::{AuthError, Result};
use crate::token::{AccessClaims, INVALID_ACCESS_TOKEN};
use crate::validation::Credentials;

impl AccountManager {
    /// Confirm an email/password pair and return the stored account.
    ///
    /// `credentials.email` must already be lowercase (the login validators
    /// guarantee it). Callers reuse the returned record instead of looking
    /// the account up again.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn verify_credentials(&self, credentials: &Credentials) -> Result<Account> {
        let account = self
            .store
            .find_by_email(&credentials.email)
            .await?
            .ok_or_else(|| AuthError::NotRegistered(credentials.email.clone()))?;

        if !verify_password(&credentials.password, &account.password_hash).await? {
            warn!(user_id = %account.id, "credential check failed: wrong password");
            return Err(AuthError::WrongPassword);
        }
        Ok(account)
    }

    /// Verify credentials and mint one new refresh token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let account = self.verify_credentials(credentials).await?;
        let token = self.refresh.issue(&account).await?;
        info!(user_id = %account.id, "user logged in");
        Ok(token)
    }

    /// Exchange a live refresh token for a short-lived access token. The
    /// refresh token stays in the allow-list.
    #[instrument(skip_all)]
    pub async fn access_token(&self, refresh_token: Option<&str>) -> Result<String> {
        let validated = self.refresh.validate(refresh_token).await?;
        self.access.issue(&validated.account)
    }

    pub fn decode_access_token(&self, access_token: Option<&str>) -> Result<AccessClaims> {
        match access_token {
            Some(token) if !token.is_empty() => self.access.verify(token),
            _ => Err(AuthError::Unauthorized(INVALID_ACCESS_TOKEN.into())),
        }
    }

    /// Revoke the presented refresh token only.
    #[instrument(skip_all)]
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<()> {
        let validated = self.refresh.validate(refresh_token).await?;
        self.refresh
            .revoke_one(&validated.account, &validated.token)
            .await
    }

    /// Revoke every refresh token of the account, after a credential check.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn logout_all(&self, credentials: &Credentials) -> Result<()> {
        let account = self.verify_credentials(credentials).await?;
        self.refresh.revoke_all(&account).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::manager::tests::{credentials, manager, manager_with, registration};
    use super::*;
    use crate::config::AuthConfig;

    #[tokio::test]
    async fn unknown_email_is_not_registered() {
        let manager = manager();
        let err = manager
            .verify_credentials(&credentials("nobody@example.com", "engine1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotRegistered(_)));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let err = manager
            .login(&credentials("ada@example.com", "engine2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongPassword));
    }

    #[tokio::test]
    async fn login_appends_one_distinct_token() {
        let manager = manager();
        let account = manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let creds = credentials("ada@example.com", "engine1");

        let first = manager.login(&creds).await.unwrap();
        let second = manager.login(&creds).await.unwrap();
        assert_ne!(first, second);

        let stored = manager.store().find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_tokens, vec![first, second]);
    }

    #[tokio::test]
    async fn access_token_carries_identity_and_keeps_refresh_token() {
        let manager = manager();
        let account = manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let refresh = manager
            .login(&credentials("ada@example.com", "engine1"))
            .await
            .unwrap();

        let access = manager.access_token(Some(&refresh)).await.unwrap();
        let claims = manager.decode_access_token(Some(&access)).unwrap();
        assert_eq!(claims.user_id, account.id);
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.last_name, "Lovelace");

        // Still reusable.
        manager.access_token(Some(&refresh)).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let refresh = manager
            .login(&credentials("ada@example.com", "engine1"))
            .await
            .unwrap();
        assert!(matches!(
            manager.decode_access_token(Some(&refresh)).unwrap_err(),
            AuthError::Unauthorized(_)
        ));
        assert!(matches!(
            manager.decode_access_token(None).unwrap_err(),
            AuthError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn logout_revokes_only_that_token() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let creds = credentials("ada@example.com", "engine1");
        let phone = manager.login(&creds).await.unwrap();
        let laptop = manager.login(&creds).await.unwrap();

        manager.access_token(Some(&phone)).await.unwrap();
        manager.logout(Some(&phone)).await.unwrap();

        assert!(matches!(
            manager.access_token(Some(&phone)).await.unwrap_err(),
            AuthError::TokenRevoked
        ));
        assert!(matches!(
            manager.logout(Some(&phone)).await.unwrap_err(),
            AuthError::TokenRevoked
        ));
        manager.access_token(Some(&laptop)).await.unwrap();
    }

    #[tokio::test]
    async fn logout_all_invalidates_every_token() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let creds = credentials("ada@example.com", "engine1");
        let mut tokens = Vec::new();
        for _ in 0..4 {
            tokens.push(manager.login(&creds).await.unwrap());
        }

        manager.logout_all(&creds).await.unwrap();

        for token in &tokens {
            assert!(matches!(
                manager.access_token(Some(token)).await.unwrap_err(),
                AuthError::TokenRevoked
            ));
        }
        // A fresh login works again.
        let fresh = manager.login(&creds).await.unwrap();
        manager.access_token(Some(&fresh)).await.unwrap();
    }

    #[tokio::test]
    async fn login_racing_a_password_change_mints_nothing() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let old = credentials("ada@example.com", "engine1");

        let checked = manager.verify_credentials(&old).await.unwrap();
        manager.change_password(&old, "engine2").await.unwrap();
        let err = manager
            .refresh_registry()
            .issue(&checked)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CredentialsChanged));

        let stored = manager.store().find_by_id(&checked.id).await.unwrap().unwrap();
        assert!(stored.refresh_tokens.is_empty());
    }

    #[tokio::test]
    async fn login_racing_logout_all_mints_nothing() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let creds = credentials("ada@example.com", "engine1");
        let earlier = manager.login(&creds).await.unwrap();

        let checked = manager.verify_credentials(&creds).await.unwrap();
        manager.logout_all(&creds).await.unwrap();
        assert!(matches!(
            manager.refresh_registry().issue(&checked).await.unwrap_err(),
            AuthError::CredentialsChanged
        ));
        assert!(matches!(
            manager.access_token(Some(&earlier)).await.unwrap_err(),
            AuthError::TokenRevoked
        ));

        // A login that starts after the revocation is unaffected.
        let fresh = manager.login(&creds).await.unwrap();
        manager.access_token(Some(&fresh)).await.unwrap();
    }

    #[tokio::test]
    async fn oversized_access_ttl_fails_without_panicking() {
        let manager = manager_with(
            AuthConfig::new("access-secret", "refresh-secret")
                .with_bcrypt_cost(4)
                .with_access_ttl(i64::MAX),
        );
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let refresh = manager
            .login(&credentials("ada@example.com", "engine1"))
            .await
            .unwrap();
        let err = manager.access_token(Some(&refresh)).await.unwrap_err();
        assert!(matches!(err, AuthError::Token(_)));
        assert!(err.is_internal());
    }
}
