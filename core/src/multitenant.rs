//! Multitenant manager trait
//!
//! Defines the interface for the collaborator that provisions tenant
//! sub-wallets, issues their auth tokens and removes them. Route handlers
//! only ever see this trait; the concrete manager is injected through
//! application state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::wallet::{KeyManagementMode, WalletRecord, WalletSettings};
use crate::Result;

/// Collaborator interface for tenant wallet lifecycle operations
#[async_trait]
pub trait MultitenantManager: Send + Sync {
    /// Provision a new tenant sub-wallet from the given settings
    async fn create_wallet(
        &self,
        settings: WalletSettings,
        key_management_mode: KeyManagementMode,
    ) -> Result<WalletRecord>;

    /// Merge settings into an existing tenant sub-wallet
    async fn update_wallet(
        &self,
        wallet_id: Uuid,
        settings: WalletSettings,
    ) -> Result<WalletRecord>;

    /// Issue an auth token for the tenant.
    ///
    /// Unmanaged wallets require `wallet_key`; the issued-at is recorded on
    /// the stored record so earlier tokens can be invalidated.
    async fn create_auth_token(
        &self,
        record: &WalletRecord,
        wallet_key: Option<&str>,
    ) -> Result<String>;

    /// Remove the tenant sub-wallet.
    ///
    /// Unmanaged wallets require `wallet_key`.
    async fn remove_wallet(&self, wallet_id: Uuid, wallet_key: Option<&str>) -> Result<()>;

    /// Best-effort auto-endorser configuration for a newly provisioned
    /// tenant. A no-op when the agent has no endorser configured.
    async fn attempt_endorser_setup(&self, record: &WalletRecord) -> Result<()>;
}
