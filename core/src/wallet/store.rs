//! Wallet record store
//!
//! Provides file-based persistence for tenant wallet records.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

use super::model::WalletRecord;
use super::settings;

/// Default number of records returned by a query
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Upper bound on a single query page
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Exact-match tag filter for wallet queries
#[derive(Debug, Clone, Default)]
pub struct WalletQuery {
    /// Match on the `wallet.name` setting
    pub wallet_name: Option<String>,
    /// Match on the record's group identifier
    pub group_id: Option<String>,
}

impl WalletQuery {
    fn matches(&self, record: &WalletRecord) -> bool {
        if let Some(name) = &self.wallet_name {
            if record.wallet_name() != Some(name.as_str()) {
                return false;
            }
        }
        if let Some(group) = &self.group_id {
            if record.group_id.as_deref() != Some(group.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Pagination over creation order
#[derive(Debug, Clone)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
    pub descending: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            descending: false,
        }
    }
}

/// Thread-safe wallet record store with file persistence
#[derive(Clone)]
pub struct WalletStore {
    /// In-memory cache of wallet records
    wallets: Arc<RwLock<HashMap<Uuid, WalletRecord>>>,
    /// Path to the wallets JSON file
    file_path: PathBuf,
}

impl WalletStore {
    /// Create a new WalletStore with the given file path
    pub async fn new(file_path: PathBuf) -> Result<Self> {
        let wallets = if file_path.exists() {
            let content = tokio::fs::read_to_string(&file_path)
                .await
                .map_err(|e| Error::Storage(format!("Failed to read wallets file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| Error::Storage(format!("Failed to parse wallets file: {}", e)))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            wallets: Arc::new(RwLock::new(wallets)),
            file_path,
        })
    }

    /// Insert a newly created record.
    ///
    /// Wallet names are unique across tenants; inserting a record whose
    /// `wallet.name` is already taken fails.
    pub async fn insert(&self, record: WalletRecord) -> Result<WalletRecord> {
        let mut wallets = self.wallets.write().await;

        if let Some(name) = record.settings.get_str(settings::WALLET_NAME) {
            if wallets
                .values()
                .any(|w| w.wallet_id != record.wallet_id && w.wallet_name() == Some(name))
            {
                return Err(Error::DuplicateWalletName(name.to_string()));
            }
        }

        wallets.insert(record.wallet_id, record.clone());
        drop(wallets);
        self.persist().await?;
        Ok(record)
    }

    /// Get a wallet record by ID
    pub async fn get(&self, wallet_id: Uuid) -> Option<WalletRecord> {
        let wallets = self.wallets.read().await;
        wallets.get(&wallet_id).cloned()
    }

    /// Get a wallet record by ID, failing if it does not exist
    pub async fn retrieve(&self, wallet_id: Uuid) -> Result<WalletRecord> {
        self.get(wallet_id)
            .await
            .ok_or_else(|| Error::WalletNotFound(wallet_id.to_string()))
    }

    /// Find a wallet record by its `wallet.name` setting
    pub async fn find_by_name(&self, name: &str) -> Option<WalletRecord> {
        let wallets = self.wallets.read().await;
        wallets
            .values()
            .find(|w| w.wallet_name() == Some(name))
            .cloned()
    }

    /// Query records by exact tag match, paginated over creation order
    pub async fn query(&self, query: &WalletQuery, page: &Pagination) -> Result<Vec<WalletRecord>> {
        if page.limit == 0 || page.limit > MAX_PAGE_SIZE {
            return Err(Error::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let wallets = self.wallets.read().await;
        let mut records: Vec<WalletRecord> = wallets
            .values()
            .filter(|w| query.matches(w))
            .cloned()
            .collect();
        drop(wallets);

        records.sort_by(|a, b| {
            (a.created_at, a.wallet_id).cmp(&(b.created_at, b.wallet_id))
        });
        if page.descending {
            records.reverse();
        }

        Ok(records
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .collect())
    }

    /// Save changes to an existing record
    pub async fn save(&self, record: WalletRecord) -> Result<WalletRecord> {
        let mut wallets = self.wallets.write().await;

        if !wallets.contains_key(&record.wallet_id) {
            return Err(Error::WalletNotFound(record.wallet_id.to_string()));
        }

        let mut updated = record;
        updated.updated_at = chrono::Utc::now();
        wallets.insert(updated.wallet_id, updated.clone());

        drop(wallets);
        self.persist().await?;
        Ok(updated)
    }

    /// Delete a wallet record
    pub async fn delete(&self, wallet_id: Uuid) -> Result<Option<WalletRecord>> {
        let mut wallets = self.wallets.write().await;
        let removed = wallets.remove(&wallet_id);

        if removed.is_some() {
            drop(wallets);
            self.persist().await?;
        }

        Ok(removed)
    }

    /// Persist the current state to file
    async fn persist(&self) -> Result<()> {
        let wallets = self.wallets.read().await;
        let content = serde_json::to_string_pretty(&*wallets)
            .map_err(|e| Error::Storage(format!("Failed to serialize wallets: {}", e)))?;

        // Ensure parent directory exists
        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
        }

        tokio::fs::write(&self.file_path, content)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write wallets file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{KeyManagementMode, WalletSettings};
    use tempfile::tempdir;

    fn record(name: &str, group_id: Option<&str>) -> WalletRecord {
        let mut settings = WalletSettings::new();
        settings.insert(super::settings::WALLET_TYPE, "askar");
        settings.insert(super::settings::WALLET_NAME, name);
        settings.insert(super::settings::WALLET_KEY, "key");
        let record = WalletRecord::new(settings, KeyManagementMode::Managed);
        match group_id {
            Some(group) => record.with_group_id(group),
            None => record,
        }
    }

    #[tokio::test]
    async fn test_create_empty_store() {
        let dir = tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallets.json")).await.unwrap();

        let records = store
            .query(&WalletQuery::default(), &Pagination::default())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wallets.json");

        let store = WalletStore::new(path.clone()).await.unwrap();
        let created = store.insert(record("w1", Some("g1"))).await.unwrap();

        // Verify persistence across a fresh load
        let store2 = WalletStore::new(path).await.unwrap();
        let loaded = store2.retrieve(created.wallet_id).await.unwrap();
        assert_eq!(loaded.wallet_name(), Some("w1"));
        assert_eq!(loaded.group_id.as_deref(), Some("g1"));
    }

    #[tokio::test]
    async fn test_insert_duplicate_name_fails() {
        let dir = tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallets.json")).await.unwrap();

        store.insert(record("w1", None)).await.unwrap();
        let err = store.insert(record("w1", None)).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateWalletName(_)));
    }

    #[tokio::test]
    async fn test_query_filters() {
        let dir = tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallets.json")).await.unwrap();

        store.insert(record("w1", Some("g1"))).await.unwrap();
        store.insert(record("w2", Some("g1"))).await.unwrap();
        store.insert(record("w3", Some("g2"))).await.unwrap();
        store.insert(record("w4", None)).await.unwrap();

        let by_group = store
            .query(
                &WalletQuery {
                    group_id: Some("g1".to_string()),
                    ..Default::default()
                },
                &Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_group.len(), 2);
        assert!(by_group.iter().all(|w| w.group_id.as_deref() == Some("g1")));

        let by_name = store
            .query(
                &WalletQuery {
                    wallet_name: Some("w3".to_string()),
                    ..Default::default()
                },
                &Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].group_id.as_deref(), Some("g2"));

        let both = store
            .query(
                &WalletQuery {
                    wallet_name: Some("w1".to_string()),
                    group_id: Some("g2".to_string()),
                },
                &Pagination::default(),
            )
            .await
            .unwrap();
        assert!(both.is_empty());
    }

    #[tokio::test]
    async fn test_query_pagination_creation_order() {
        let dir = tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallets.json")).await.unwrap();

        for name in ["w1", "w2", "w3"] {
            store.insert(record(name, None)).await.unwrap();
        }

        let page = store
            .query(
                &WalletQuery::default(),
                &Pagination {
                    limit: 2,
                    offset: 1,
                    descending: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].wallet_name(), Some("w2"));
        assert_eq!(page[1].wallet_name(), Some("w3"));

        let newest_first = store
            .query(
                &WalletQuery::default(),
                &Pagination {
                    limit: 1,
                    offset: 0,
                    descending: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(newest_first[0].wallet_name(), Some("w3"));
    }

    #[tokio::test]
    async fn test_query_rejects_zero_limit() {
        let dir = tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallets.json")).await.unwrap();

        let err = store
            .query(
                &WalletQuery::default(),
                &Pagination {
                    limit: 0,
                    offset: 0,
                    descending: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_save_unknown_record_fails() {
        let dir = tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallets.json")).await.unwrap();

        let err = store.save(record("ghost", None)).await.unwrap_err();
        assert!(matches!(err, Error::WalletNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallets.json")).await.unwrap();

        let created = store.insert(record("w1", None)).await.unwrap();
        let removed = store.delete(created.wallet_id).await.unwrap();
        assert!(removed.is_some());

        assert!(store.get(created.wallet_id).await.is_none());
        assert!(store.delete(created.wallet_id).await.unwrap().is_none());
    }
}
