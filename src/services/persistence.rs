//! Keyed record storage and the paper-trading balance

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record in {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid key '{0}'")]
    InvalidKey(String),
}

#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Appends `record` to the list stored under `key`
    async fn append(&self, key: &str, record: Value) -> Result<(), PersistenceError>;

    /// All records under `key`, oldest first; empty when the key is new
    async fn records(&self, key: &str) -> Result<Vec<Value>, PersistenceError>;

    /// Stored balance, `None` before the first write
    async fn read_balance(&self) -> Result<Option<f64>, PersistenceError>;

    async fn write_balance(&self, amount: f64) -> Result<(), PersistenceError>;
}

/// One pretty-printed JSON file per key under a directory
pub struct JsonFileStore {
    dir: PathBuf,
}

const BALANCE_FILE: &str = "balance.json";

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    async fn read_json(&self, path: &Path) -> Result<Option<Value>, PersistenceError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| PersistenceError::Corrupt {
                    path: path.display().to_string(),
                    source,
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    async fn write_json(&self, path: &Path, value: &Value) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        tokio::fs::write(path, bytes).await.map_err(io_err)
    }
}

#[async_trait]
impl PersistenceStore for JsonFileStore {
    async fn append(&self, key: &str, record: Value) -> Result<(), PersistenceError> {
        let path = self.key_path(key)?;
        let mut records = self.records(key).await?;
        records.push(record);
        self.write_json(&path, &Value::Array(records)).await
    }

    async fn records(&self, key: &str) -> Result<Vec<Value>, PersistenceError> {
        let path = self.key_path(key)?;
        match self.read_json(&path).await? {
            Some(Value::Array(records)) => Ok(records),
            Some(other) => Ok(vec![other]),
            None => Ok(Vec::new()),
        }
    }

    async fn read_balance(&self) -> Result<Option<f64>, PersistenceError> {
        let path = self.dir.join(BALANCE_FILE);
        Ok(self
            .read_json(&path)
            .await?
            .and_then(|v| v.get("balance").and_then(Value::as_f64)))
    }

    async fn write_balance(&self, amount: f64) -> Result<(), PersistenceError> {
        let path = self.dir.join(BALANCE_FILE);
        self.write_json(&path, &json!({ "balance": amount })).await
    }
}

/// In-process store for tests and dry runs
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Vec<Value>>>,
    balance: RwLock<Option<f64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(balance: f64) -> Self {
        Self {
            records: RwLock::default(),
            balance: RwLock::new(Some(balance)),
        }
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
    async fn append(&self, key: &str, record: Value) -> Result<(), PersistenceError> {
        self.records
            .write()
            .await
            .entry(key.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn records(&self, key: &str) -> Result<Vec<Value>, PersistenceError> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn read_balance(&self) -> Result<Option<f64>, PersistenceError> {
        Ok(*self.balance.read().await)
    }

    async fn write_balance(&self, amount: f64) -> Result<(), PersistenceError> {
        *self.balance.write().await = Some(amount);
        Ok(())
    }
}
