//! Account store gateway: the durable home of account records.
//!
//! The rest of the crate only sees [`AccountStore`]. Mutations go through
//! [`AccountStore::save`] with a field-scoped [`AccountUpdate`], applied
//! atomically under the store's write lock, so concurrent logins append
//! instead of overwriting each other's refresh tokens.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::Utc;
use subtle::ConstantTimeEq;

use crate::account::{Account, NewAccount};
use crate::error::{AuthError, Result};

/// A single-document mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountUpdate {
    Profile { name: String, last_name: String },
    /// Replace the hash; optionally clear every refresh token in the same write.
    Password {
        password_hash: String,
        revoke_tokens: bool,
    },
    /// Append a token minted from a credential check. Refused with
    /// `CredentialsChanged` if the password or the token generation moved
    /// since that check.
    PushRefreshToken {
        token: String,
        expected_password_hash: String,
        expected_generation: u64,
    },
    /// Remove one matching entry. A missing token is not an error.
    PullRefreshToken(String),
    ClearRefreshTokens,
}

impl AccountUpdate {
    /// Push `token`, conditional on `account` still matching the stored record.
    pub fn push_token(account: &Account, token: impl Into<String>) -> Self {
        AccountUpdate::PushRefreshToken {
            token: token.into(),
            expected_password_hash: account.password_hash.clone(),
            expected_generation: account.token_generation,
        }
    }

    /// Apply the update in place and stamp `updated_at`. On error the
    /// account is left untouched.
    pub fn apply(self, account: &mut Account) -> Result<()> {
        match self {
            AccountUpdate::Profile { name, last_name } => {
                account.name = name;
                account.last_name = last_name;
            }
            AccountUpdate::Password {
                password_hash,
                revoke_tokens,
            } => {
                account.password_hash = password_hash;
                if revoke_tokens {
                    clear_tokens(account);
                }
            }
            AccountUpdate::PushRefreshToken {
                token,
                expected_password_hash,
                expected_generation,
            } => {
                if account.password_hash != expected_password_hash
                    || account.token_generation != expected_generation
                {
                    return Err(AuthError::CredentialsChanged);
                }
                account.refresh_tokens.push(token);
            }
            AccountUpdate::PullRefreshToken(token) => {
                if let Some(pos) = position_of(&account.refresh_tokens, &token) {
                    account.refresh_tokens.remove(pos);
                }
            }
            AccountUpdate::ClearRefreshTokens => clear_tokens(account),
        }
        account.updated_at = Utc::now();
        Ok(())
    }
}

fn clear_tokens(account: &mut Account) {
    account.refresh_tokens.clear();
    account.token_generation += 1;
}

/// Index of `token` in an allow-list, compared in constant time per entry.
pub fn position_of(tokens: &[String], token: &str) -> Option<usize> {
    tokens
        .iter()
        .position(|t| bool::from(t.as_bytes().ct_eq(token.as_bytes())))
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Exact match on the lowercase email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>>;

    /// Insert a new account. Fails with `EmailTaken` if the email is already
    /// present; the check and the insert are one atomic step.
    async fn create(&self, account: NewAccount) -> Result<Account>;

    /// Apply `update` to the account with `id`. Returns the updated record,
    /// or `None` if the account no longer exists. A refused update is an
    /// error and writes nothing.
    async fn save(&self, id: &str, update: AccountUpdate) -> Result<Option<Account>>;

    /// Returns whether an account was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

pub(crate) fn new_account_record(new: NewAccount) -> Account {
    let now = Utc::now();
    Account {
        id: uuid::Uuid::new_v4().to_string(),
        name: new.name,
        last_name: new.last_name,
        email: new.email,
        password_hash: new.password_hash,
        refresh_tokens: Vec::new(),
        token_generation: 0,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(tokens: &[&str]) -> Account {
        let mut account = new_account_record(NewAccount {
            name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
        });
        account.refresh_tokens = tokens.iter().map(|t| t.to_string()).collect();
        account
    }

    #[test]
    fn pull_removes_exactly_one_entry() {
        let mut acc = account(&["a", "b", "a"]);
        AccountUpdate::PullRefreshToken("a".into())
            .apply(&mut acc)
            .unwrap();
        assert_eq!(acc.refresh_tokens, vec!["b", "a"]);
    }

    #[test]
    fn pull_of_missing_token_is_noop() {
        let mut acc = account(&["a"]);
        AccountUpdate::PullRefreshToken("zzz".into())
            .apply(&mut acc)
            .unwrap();
        assert_eq!(acc.refresh_tokens, vec!["a"]);
    }

    #[test]
    fn password_update_can_keep_tokens() {
        let mut acc = account(&["a", "b"]);
        AccountUpdate::Password {
            password_hash: "new".into(),
            revoke_tokens: false,
        }
        .apply(&mut acc)
        .unwrap();
        assert_eq!(acc.password_hash, "new");
        assert_eq!(acc.refresh_tokens.len(), 2);

        AccountUpdate::Password {
            password_hash: "newer".into(),
            revoke_tokens: true,
        }
        .apply(&mut acc)
        .unwrap();
        assert!(acc.refresh_tokens.is_empty());
    }

    #[test]
    fn apply_stamps_updated_at() {
        let mut acc = account(&[]);
        let before = acc.updated_at;
        AccountUpdate::ClearRefreshTokens.apply(&mut acc).unwrap();
        assert!(acc.updated_at >= before);
    }

    #[test]
    fn push_is_refused_after_password_change() {
        let mut acc = account(&[]);
        let snapshot = acc.clone();
        AccountUpdate::Password {
            password_hash: "new".into(),
            revoke_tokens: false,
        }
        .apply(&mut acc)
        .unwrap();

        let err = AccountUpdate::push_token(&snapshot, "t1")
            .apply(&mut acc)
            .unwrap_err();
        assert!(matches!(err, AuthError::CredentialsChanged));
        assert!(acc.refresh_tokens.is_empty());
    }

    #[test]
    fn push_is_refused_after_tokens_were_wiped() {
        let mut acc = account(&["a"]);
        let snapshot = acc.clone();
        AccountUpdate::ClearRefreshTokens.apply(&mut acc).unwrap();
        assert_eq!(acc.token_generation, snapshot.token_generation + 1);

        let err = AccountUpdate::push_token(&snapshot, "t1")
            .apply(&mut acc)
            .unwrap_err();
        assert!(matches!(err, AuthError::CredentialsChanged));

        AccountUpdate::push_token(&acc.clone(), "t2")
            .apply(&mut acc)
            .unwrap();
        assert_eq!(acc.refresh_tokens, vec!["t2"]);
    }
}
