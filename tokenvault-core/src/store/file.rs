//! JSON-file store: one document per account plus an `email -> id` index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

use super::{new_account_record, AccountStore, AccountUpdate};
use crate::account::{Account, NewAccount};
use crate::error::{AuthError, Result};

const INDEX_FILE: &str = "index.json";

/// Accounts persisted under `<data_dir>/accounts`.
///
/// Every mutation holds `write_lock` for its whole read-modify-write, and
/// files are replaced through a rename so readers never see a torn document.
/// The `email -> id` index is served from memory; `index.json` is rewritten
/// on every change and rebuilt from the documents on open.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
    index: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `data_dir` and rebuild the
    /// email index from the account documents on disk.
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let store = Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
            index: RwLock::new(HashMap::new()),
        };
        tokio::fs::create_dir_all(store.accounts_dir()).await?;
        store.rebuild_index().await?;
        Ok(store)
    }

    fn accounts_dir(&self) -> PathBuf {
        self.data_dir.join("accounts")
    }

    fn index_path(&self) -> PathBuf {
        self.accounts_dir().join(INDEX_FILE)
    }

    fn account_path(&self, id: &str) -> PathBuf {
        self.accounts_dir().join(format!("{}.json", id))
    }

    /// Ids are generated UUIDs; anything else never names a file.
    fn is_valid_id(id: &str) -> bool {
        uuid::Uuid::parse_str(id).is_ok()
    }

    async fn write_atomic(&self, path: &Path, data: Vec<u8>) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn save_index(&self, index: &HashMap<String, String>) -> Result<()> {
        let data = serde_json::to_vec_pretty(index)?;
        self.write_atomic(&self.index_path(), data).await
    }

    async fn persist(&self, account: &Account) -> Result<()> {
        let data = serde_json::to_vec_pretty(account)?;
        self.write_atomic(&self.account_path(&account.id), data)
            .await
    }

    async fn load(&self, id: &str) -> Result<Option<Account>> {
        if !Self::is_valid_id(id) {
            return Ok(None);
        }
        match tokio::fs::read(self.account_path(id)).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn rebuild_index(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rebuilt = HashMap::new();
        let mut entries = tokio::fs::read_dir(self.accounts_dir()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_account = path.extension().map(|e| e == "json").unwrap_or(false)
                && path
                    .file_name()
                    .map(|n| n != INDEX_FILE)
                    .unwrap_or(false);
            if !is_account {
                continue;
            }
            let data = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<Account>(&data) {
                Ok(account) => {
                    rebuilt.insert(account.email, account.id);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable account file"),
            }
        }
        info!(accounts = rebuilt.len(), "account index rebuilt");
        self.save_index(&rebuilt).await?;
        *self.index.write().await = rebuilt;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FileStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let id = self.index.read().await.get(email).cloned();
        match id {
            Some(id) => self.load(&id).await,
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        self.load(id).await
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn create(&self, account: NewAccount) -> Result<Account> {
        let _guard = self.write_lock.lock().await;
        if self.index.read().await.contains_key(&account.email) {
            return Err(AuthError::EmailTaken(account.email));
        }
        let account = new_account_record(account);
        self.persist(&account).await?;

        let mut index = self.index.write().await;
        index.insert(account.email.clone(), account.id.clone());
        self.save_index(&index).await?;
        Ok(account)
    }

    async fn save(&self, id: &str, update: AccountUpdate) -> Result<Option<Account>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut account) = self.load(id).await? else {
            return Ok(None);
        };
        update.apply(&mut account)?;
        self.persist(&account).await?;
        Ok(Some(account))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(account) = self.load(id).await? else {
            return Ok(false);
        };
        tokio::fs::remove_file(self.account_path(id)).await?;

        let mut index = self.index.write().await;
        index.remove(&account.email);
        self.save_index(&index).await?;
        Ok(true)
    }
}
