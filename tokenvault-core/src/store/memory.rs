use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{new_account_record, AccountStore, AccountUpdate};
use crate::account::{Account, NewAccount};
use crate::error::{AuthError, Result};

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    /// email -> id
    by_email: HashMap<String, String>,
}

/// In-process store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(id).cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(&account.email) {
            return Err(AuthError::EmailTaken(account.email));
        }
        let account = new_account_record(account);
        inner
            .by_email
            .insert(account.email.clone(), account.id.clone());
        inner.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn save(&self, id: &str, update: AccountUpdate) -> Result<Option<Account>> {
        let mut inner = self.inner.write().await;
        let Some(account) = inner.accounts.get_mut(id) else {
            return Ok(None);
        };
        update.apply(account)?;
        Ok(Some(account.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.accounts.remove(id) {
            Some(account) => {
                inner.by_email.remove(&account.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create(new_account("ada@example.com")).await.unwrap();
        let err = store
            .create(new_account("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_pushes_keep_every_token() {
        let store = Arc::new(MemoryStore::new());
        let account = store.create(new_account("ada@example.com")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            let account = account.clone();
            handles.push(tokio::spawn(async move {
                store
                    .save(&account.id, AccountUpdate::push_token(&account, format!("t{i}")))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let loaded = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(loaded.refresh_tokens.len(), 32);
    }

    #[tokio::test]
    async fn save_on_missing_account_returns_none() {
        let store = MemoryStore::new();
        let out = store
            .save("missing", AccountUpdate::ClearRefreshTokens)
            .await
            .unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn refused_push_writes_nothing() {
        let store = MemoryStore::new();
        let account = store.create(new_account("ada@example.com")).await.unwrap();
        store
            .save(&account.id, AccountUpdate::ClearRefreshTokens)
            .await
            .unwrap();

        let err = store
            .save(&account.id, AccountUpdate::push_token(&account, "stale"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CredentialsChanged));
        let loaded = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(loaded.refresh_tokens.is_empty());
    }

    #[tokio::test]
    async fn delete_frees_the_email() {
        let store = MemoryStore::new();
        let account = store.create(new_account("ada@example.com")).await.unwrap();
        assert!(store.delete(&account.id).await.unwrap());
        assert!(!store.delete(&account.id).await.unwrap());
        assert!(store
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .is_none());
        store.create(new_account("ada@example.com")).await.unwrap();
    }
}
