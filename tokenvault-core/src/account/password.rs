//! Password change.

use tracing::{info, instrument};

use super::crypto::hash_password;
use super::AccountManager;
use crate::error::{AuthError, Result};
use crate::store::AccountUpdate;
use crate::validation::Credentials;

impl AccountManager {
    /// Replace the password after a credential check. With
    /// `revoke_on_password_change` set (the default) every refresh token is
    /// cleared in the same write, forcing a new login everywhere.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn change_password(&self, credentials: &Credentials, new_password: &str) -> Result<()> {
        let account = self.verify_credentials(credentials).await?;
        let password_hash = hash_password(new_password, self.config.bcrypt_cost).await?;
        let revoke_tokens = self.config.revoke_on_password_change;

        self.store
            .save(
                &account.id,
                AccountUpdate::Password {
                    password_hash,
                    revoke_tokens,
                },
            )
            .await?
            .ok_or(AuthError::AccountGone)?;

        info!(user_id = %account.id, revoke_tokens, "password changed");
        Ok(())
    }
}
