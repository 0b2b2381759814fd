//! Store-backed multitenant manager
//!
//! Concrete implementation of the manager collaborator: validates tenant
//! settings, persists wallet records and issues tenant JWTs.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use wg_core::multitenant::MultitenantManager;
use wg_core::wallet::{
    settings, KeyManagementMode, WalletDispatchType, WalletRecord, WalletSettings, WalletStore,
    KEY_DERIVATION_METHODS,
};
use wg_core::{Error, Result};

use crate::auth::issue_wallet_jwt;
use crate::config::ServerConfig;

/// Settings keys that cannot change after the wallet is provisioned
const IMMUTABLE_SETTINGS: &[&str] = &[
    settings::WALLET_TYPE,
    settings::WALLET_NAME,
    settings::WALLET_KEY,
    settings::WALLET_KEY_DERIVATION,
];

pub struct BaseWalletManager {
    store: Arc<WalletStore>,
    config: ServerConfig,
}

impl BaseWalletManager {
    pub fn new(store: Arc<WalletStore>, config: ServerConfig) -> Self {
        Self { store, config }
    }

    fn validate_create_settings(
        settings_bag: &WalletSettings,
        key_management_mode: KeyManagementMode,
    ) -> Result<()> {
        if settings_bag.get_str(settings::WALLET_NAME).is_none() {
            return Err(Error::Settings("wallet.name is required".to_string()));
        }
        if key_management_mode == KeyManagementMode::Managed
            && settings_bag.get_str(settings::WALLET_KEY).is_none()
        {
            return Err(Error::Settings(
                "wallet.key is required for managed wallets".to_string(),
            ));
        }
        if let Some(dispatch) = settings_bag.get_str(settings::WALLET_DISPATCH_TYPE) {
            WalletDispatchType::parse(dispatch)?;
        }
        if let Some(derivation) = settings_bag.get_str(settings::WALLET_KEY_DERIVATION) {
            if !KEY_DERIVATION_METHODS.contains(&derivation) {
                return Err(Error::Settings(format!(
                    "Unsupported key derivation method '{}'",
                    derivation
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MultitenantManager for BaseWalletManager {
    async fn create_wallet(
        &self,
        settings_bag: WalletSettings,
        key_management_mode: KeyManagementMode,
    ) -> Result<WalletRecord> {
        Self::validate_create_settings(&settings_bag, key_management_mode)?;

        let mut settings_bag = settings_bag;
        if key_management_mode == KeyManagementMode::Unmanaged {
            // The caller keeps the key; never persist it
            settings_bag.remove(settings::WALLET_KEY);
        }

        let record = WalletRecord::new(settings_bag, key_management_mode);
        let record = self.store.insert(record).await?;
        tracing::info!(
            wallet_id = %record.wallet_id,
            wallet_name = record.wallet_name().unwrap_or_default(),
            "Created tenant wallet"
        );
        Ok(record)
    }

    async fn update_wallet(
        &self,
        wallet_id: Uuid,
        settings_bag: WalletSettings,
    ) -> Result<WalletRecord> {
        for key in IMMUTABLE_SETTINGS {
            if settings_bag.contains(key) {
                return Err(Error::Settings(format!(
                    "Setting '{}' cannot be changed after creation",
                    key
                )));
            }
        }
        if let Some(dispatch) = settings_bag.get_str(settings::WALLET_DISPATCH_TYPE) {
            WalletDispatchType::parse(dispatch)?;
        }

        let mut record = self.store.retrieve(wallet_id).await?;
        record.update_settings(settings_bag);
        let record = self.store.save(record).await?;
        tracing::debug!(wallet_id = %record.wallet_id, "Updated tenant wallet settings");
        Ok(record)
    }

    async fn create_auth_token(
        &self,
        record: &WalletRecord,
        wallet_key: Option<&str>,
    ) -> Result<String> {
        if record.requires_external_key() && wallet_key.is_none() {
            return Err(Error::WalletKeyMissing(record.wallet_id.to_string()));
        }

        let embedded_key = if record.requires_external_key() {
            wallet_key
        } else {
            None
        };
        let (token, iat) = issue_wallet_jwt(
            &record.wallet_id.to_string(),
            embedded_key,
            self.config.token_ttl_hours,
        )
        .map_err(Error::Token)?;

        // Record the issued-at so the host runtime can reject older tokens
        let mut stored = self.store.retrieve(record.wallet_id).await?;
        stored.jwt_iat = Some(iat);
        self.store.save(stored).await?;

        Ok(token)
    }

    async fn remove_wallet(&self, wallet_id: Uuid, wallet_key: Option<&str>) -> Result<()> {
        let record = self.store.retrieve(wallet_id).await?;
        if record.requires_external_key() && wallet_key.is_none() {
            return Err(Error::WalletKeyMissing(wallet_id.to_string()));
        }

        self.store.delete(wallet_id).await?;
        tracing::info!(wallet_id = %wallet_id, "Removed tenant wallet");
        Ok(())
    }

    async fn attempt_endorser_setup(&self, record: &WalletRecord) -> Result<()> {
        let Some(alias) = &self.config.endorser_alias else {
            return Ok(());
        };

        let mut stored = self.store.retrieve(record.wallet_id).await?;
        let mut endorser_settings = WalletSettings::new();
        endorser_settings.insert("endorser.author", true);
        endorser_settings.insert("endorser.endorser_alias", alias.clone());
        stored.update_settings(endorser_settings);
        self.store.save(stored).await?;

        tracing::info!(
            wallet_id = %record.wallet_id,
            endorser_alias = alias.as_str(),
            "Configured tenant as endorser author"
        );
        Ok(())
    }
}
