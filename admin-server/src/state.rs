//! Application state

use std::sync::Arc;

use wg_core::multitenant::MultitenantManager;
use wg_core::wallet::WalletStore;

use crate::config::ServerConfig;
use crate::multitenant::BaseWalletManager;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    wallet_store: Arc<WalletStore>,
    multitenant_mgr: Arc<dyn MultitenantManager>,
    config: ServerConfig,
}

impl AppState {
    /// Create a new AppState from the given configuration
    pub async fn new(config: ServerConfig) -> wg_core::Result<Self> {
        let wallets_path = config.data_dir.join("wallets.json");
        let wallet_store = Arc::new(WalletStore::new(wallets_path).await?);
        let multitenant_mgr: Arc<dyn MultitenantManager> = Arc::new(BaseWalletManager::new(
            Arc::clone(&wallet_store),
            config.clone(),
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                wallet_store,
                multitenant_mgr,
                config,
            }),
        })
    }

    /// Build state from pre-constructed collaborators
    pub fn with_parts(
        wallet_store: Arc<WalletStore>,
        multitenant_mgr: Arc<dyn MultitenantManager>,
        config: ServerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                wallet_store,
                multitenant_mgr,
                config,
            }),
        }
    }

    /// Get reference to the wallet store
    pub fn wallet_store(&self) -> &WalletStore {
        &self.inner.wallet_store
    }

    /// Get the injected multitenant manager
    pub fn multitenant_mgr(&self) -> &Arc<dyn MultitenantManager> {
        &self.inner.multitenant_mgr
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }
}
