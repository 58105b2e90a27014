//! Credential lifecycle: absent → stored → updated → removed.
//!
//! `CredentialStore` is the only component that mutates credential rows. It sits on
//! top of a `RecordStore` port (SQLite in production, in-memory in tests) and turns
//! row counts into the typed `DuplicateKey` / `NotFound` outcomes the handlers branch on.

use tracing::{debug, info};

use crate::domain::{Address, Credential, Secret};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a credential already exists for {0}")]
    DuplicateKey(String),

    #[error("no credential on file for {0}")]
    NotFound(String),

    #[error("refusing to store an empty secret")]
    EmptySecret,

    #[error("credential store unreachable: {0}")]
    Connection(String),

    #[error("credential store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Raw access to the `keys(email, api_key)` table.
///
/// Implementations must bind `address`/`secret` as query parameters; values are never
/// formatted into SQL text. Each call commits on its own.
pub trait RecordStore: Send {
    fn select(&self, address: &str) -> StoreResult<Option<String>>;

    /// Insert a new row. A primary-key conflict is reported as `StoreError::DuplicateKey`.
    fn insert(&mut self, address: &str, secret: &str) -> StoreResult<()>;

    /// Returns the number of rows changed.
    fn update(&mut self, address: &str, secret: &str) -> StoreResult<usize>;

    /// Returns the number of rows deleted.
    fn delete(&mut self, address: &str) -> StoreResult<usize>;
}

/// Single-key-per-user credential table.
pub struct CredentialStore {
    records: Box<dyn RecordStore>,
}

impl CredentialStore {
    pub fn new(records: Box<dyn RecordStore>) -> Self {
        Self { records }
    }

    pub fn find(&self, address: &Address) -> StoreResult<Option<Credential>> {
        let row = self.records.select(address.as_str())?;
        debug!(%address, found = row.is_some(), "credential lookup");
        Ok(row
            .filter(|s| !s.is_empty())
            .map(|secret| Credential {
                address: address.clone(),
                secret: Secret::new(secret),
            }))
    }

    /// Fails with `DuplicateKey` when a row exists; callers decide insert vs update.
    pub fn insert(&mut self, address: &Address, secret: &Secret) -> StoreResult<()> {
        if secret.is_empty() {
            return Err(StoreError::EmptySecret);
        }
        self.records.insert(address.as_str(), secret.expose())?;
        info!(%address, "credential stored");
        Ok(())
    }

    pub fn update(&mut self, address: &Address, secret: &Secret) -> StoreResult<()> {
        if secret.is_empty() {
            return Err(StoreError::EmptySecret);
        }
        match self.records.update(address.as_str(), secret.expose())? {
            0 => Err(StoreError::NotFound(address.to_string())),
            _ => {
                info!(%address, "credential updated");
                Ok(())
            }
        }
    }

    /// Not idempotent: removing an absent row is `NotFound`.
    pub fn remove(&mut self, address: &Address) -> StoreResult<()> {
        match self.records.delete(address.as_str())? {
            0 => Err(StoreError::NotFound(address.to_string())),
            _ => {
                info!(%address, "credential removed");
                Ok(())
            }
        }
    }
}

/// `RecordStore` over a `HashMap`, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: std::collections::HashMap<String, String>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn select(&self, address: &str) -> StoreResult<Option<String>> {
        Ok(self.rows.get(address).cloned())
    }

    fn insert(&mut self, address: &str, secret: &str) -> StoreResult<()> {
        if self.rows.contains_key(address) {
            return Err(StoreError::DuplicateKey(address.to_string()));
        }
        self.rows.insert(address.to_string(), secret.to_string());
        Ok(())
    }

    fn update(&mut self, address: &str, secret: &str) -> StoreResult<usize> {
        match self.rows.get_mut(address) {
            Some(v) => {
                *v = secret.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete(&mut self, address: &str) -> StoreResult<usize> {
        Ok(usize::from(self.rows.remove(address).is_some()))
    }
}
