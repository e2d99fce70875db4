//! Account persistence.
//!
//! The gateway only needs two operations from its store: insert an
//! account unless one already exists, and look up a password digest.
//! [`FileAccountStore`] keeps accounts in a JSON file so registrations
//! survive restarts; [`MemoryAccountStore`] is for tests and embedding.

use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default location of the account file.
pub const DEFAULT_ACCOUNTS_PATH: &str = "config/accounts.json";

/// Storage for mail accounts.
///
/// Implementations must be safe to call from concurrent requests.
pub trait AccountStore: Send + Sync {
    /// Inserts an account. Returns false if `mlid` is already registered,
    /// in which case nothing is changed.
    fn insert_account(&self, mlid: &str, passwd_digest: &str, mlchkid_digest: &str)
        -> StoreResult<bool>;

    /// Returns the stored password digest for `mlid`.
    fn passwd_digest(&self, mlid: &str) -> StoreResult<Option<String>>;

    /// Verifies the store is reachable and writable.
    ///
    /// Called once before the gateway starts serving.
    fn check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AccountRecord {
    passwd_digest: String,
    mlchkid_digest: String,
}

/// In-memory account store.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<String, AccountRecord>>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Returns true if no accounts are registered.
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Returns the stored mail-check digest for `mlid`.
    pub fn mlchkid_digest(&self, mlid: &str) -> Option<String> {
        self.accounts
            .read()
            .get(mlid)
            .map(|record| record.mlchkid_digest.clone())
    }
}

impl AccountStore for MemoryAccountStore {
    fn insert_account(
        &self,
        mlid: &str,
        passwd_digest: &str,
        mlchkid_digest: &str,
    ) -> StoreResult<bool> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(mlid) {
            return Ok(false);
        }

        accounts.insert(
            mlid.to_string(),
            AccountRecord {
                passwd_digest: passwd_digest.to_string(),
                mlchkid_digest: mlchkid_digest.to_string(),
            },
        );
        Ok(true)
    }

    fn passwd_digest(&self, mlid: &str) -> StoreResult<Option<String>> {
        Ok(self
            .accounts
            .read()
            .get(mlid)
            .map(|record| record.passwd_digest.clone()))
    }
}

/// Account store persisted as a JSON file.
///
/// The whole file is rewritten on every registration through a temporary
/// file and a rename, so a crash leaves either the old or the new contents.
/// Lookups are served from memory.
#[derive(Debug)]
pub struct FileAccountStore {
    path: PathBuf,
    accounts: RwLock<BTreeMap<String, AccountRecord>>,
}

impl FileAccountStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let accounts = match fs::read(&path) {
            Ok(raw) if raw.is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| {
                StoreError::Unavailable(format!("{} is corrupt: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "unable to read {}: {e}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path,
            accounts: RwLock::new(accounts),
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Returns true if no accounts are registered.
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Writes `accounts` to disk. Callers hold the write lock.
    fn persist(&self, accounts: &BTreeMap<String, AccountRecord>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(accounts)?;
        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)
    }
}

impl AccountStore for FileAccountStore {
    fn insert_account(
        &self,
        mlid: &str,
        passwd_digest: &str,
        mlchkid_digest: &str,
    ) -> StoreResult<bool> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(mlid) {
            return Ok(false);
        }

        accounts.insert(
            mlid.to_string(),
            AccountRecord {
                passwd_digest: passwd_digest.to_string(),
                mlchkid_digest: mlchkid_digest.to_string(),
            },
        );
        if let Err(e) = self.persist(&accounts) {
            accounts.remove(mlid);
            return Err(StoreError::Query(format!(
                "unable to write {}: {e}",
                self.path.display()
            )));
        }
        Ok(true)
    }

    fn passwd_digest(&self, mlid: &str) -> StoreResult<Option<String>> {
        Ok(self
            .accounts
            .read()
            .get(mlid)
            .map(|record| record.passwd_digest.clone()))
    }

    fn check(&self) -> StoreResult<()> {
        let accounts = self.accounts.write();
        self.persist(&accounts).map_err(|e| {
            StoreError::Unavailable(format!("unable to write {}: {e}", self.path.display()))
        })
    }
}
