//! Account manager: core structure plus registration, profile update and deletion.

use std::sync::Arc;

use tracing::{info, instrument};

use super::crypto::hash_password;
use super::models::*;
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::store::{AccountStore, AccountUpdate};
use crate::token::{AccessTokenCodec, RefreshTokenRegistry};
use crate::validation::{Credentials, Profile, Registration};

/// Runs every account operation against an injected [`AccountStore`].
pub struct AccountManager {
    pub(super) store: Arc<dyn AccountStore>,
    pub(super) access: AccessTokenCodec,
    pub(super) refresh: RefreshTokenRegistry,
    pub(super) config: AuthConfig,
}

// ============================================================================
// Construction
// ============================================================================

impl AccountManager {
    pub fn new(store: Arc<dyn AccountStore>, config: AuthConfig) -> Self {
        Self {
            access: AccessTokenCodec::new(&config.access_secret, config.access_token_ttl),
            refresh: RefreshTokenRegistry::new(store.clone(), &config.refresh_secret),
            store,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn access_codec(&self) -> &AccessTokenCodec {
        &self.access
    }

    pub fn refresh_registry(&self) -> &RefreshTokenRegistry {
        &self.refresh
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Account CRUD
// ============================================================================

impl AccountManager {
    /// Create an account from validated fields. The account starts with no
    /// refresh tokens; those are minted on login.
    #[instrument(skip(self, reg), fields(email = %reg.email))]
    pub async fn register(&self, reg: Registration) -> Result<Account> {
        // Cheap pre-check so a taken email never pays for a bcrypt hash;
        // `create` repeats it atomically.
        if self.store.find_by_email(&reg.email).await?.is_some() {
            return Err(AuthError::EmailTaken(reg.email));
        }

        let password_hash = hash_password(&reg.password, self.config.bcrypt_cost).await?;
        let account = self
            .store
            .create(NewAccount {
                name: reg.name,
                last_name: reg.last_name,
                email: reg.email,
                password_hash,
            })
            .await?;

        info!(user_id = %account.id, "account registered");
        Ok(account)
    }

    /// Change name and last name of the account owning `refresh_token`.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, profile: Profile, refresh_token: Option<&str>) -> Result<Account> {
        let validated = self.refresh.validate(refresh_token).await?;
        let account = self
            .store
            .save(
                &validated.account.id,
                AccountUpdate::Profile {
                    name: profile.name,
                    last_name: profile.last_name,
                },
            )
            .await?
            .ok_or(AuthError::AccountGone)?;

        info!(user_id = %account.id, "profile updated");
        Ok(account)
    }

    /// Delete the account; its refresh tokens go with the document.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn delete_account(&self, credentials: &Credentials) -> Result<()> {
        let account = self.verify_credentials(credentials).await?;
        if !self.store.delete(&account.id).await? {
            return Err(AuthError::AccountGone);
        }
        info!(user_id = %account.id, "account deleted");
        Ok(())
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::account::crypto::verify_password;
    use crate::store::MemoryStore;

    pub fn manager() -> AccountManager {
        manager_with(AuthConfig::new("access-secret", "refresh-secret").with_bcrypt_cost(4))
    }

    pub fn manager_with(config: AuthConfig) -> AccountManager {
        AccountManager::new(Arc::new(MemoryStore::new()), config)
    }

    pub fn registration(email: &str) -> Registration {
        Registration {
            name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: "engine1".into(),
        }
    }

    pub fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_hashes_password() {
        let manager = manager();
        let account = manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        assert_eq!(account.email, "ada@example.com");
        assert_ne!(account.password_hash, "engine1");
        assert!(verify_password("engine1", &account.password_hash)
            .await
            .unwrap());
        assert!(account.refresh_tokens.is_empty());
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let err = manager
            .register(registration("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn update_profile_requires_live_refresh_token() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let token = manager
            .login(&credentials("ada@example.com", "engine1"))
            .await
            .unwrap();

        let profile = Profile {
            name: "Augusta".into(),
            last_name: "King".into(),
        };
        let updated = manager
            .update_profile(profile.clone(), Some(&token))
            .await
            .unwrap();
        assert_eq!(updated.name, "Augusta");
        assert_eq!(updated.last_name, "King");
        assert_eq!(updated.refresh_tokens, vec![token.clone()]);

        manager.logout(Some(&token)).await.unwrap();
        let err = manager
            .update_profile(profile, Some(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));
    }

    #[tokio::test]
    async fn delete_account_makes_tokens_gone() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let creds = credentials("ada@example.com", "engine1");
        let token = manager.login(&creds).await.unwrap();

        manager.delete_account(&creds).await.unwrap();

        let err = manager.access_token(Some(&token)).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountGone));
        let err = manager.delete_account(&creds).await.unwrap_err();
        assert!(matches!(err, AuthError::NotRegistered(_)));
    }

    #[tokio::test]
    async fn delete_account_checks_password() {
        let manager = manager();
        manager
            .register(registration("ada@example.com"))
            .await
            .unwrap();
        let err = manager
            .delete_account(&credentials("ada@example.com", "wrong-pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongPassword));
        assert!(manager
            .store()
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .is_some());
    }
}
