//! Wallet record model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

use super::settings::{self, WalletSettings};

/// Key derivation methods accepted for `wallet.key_derivation_method`
pub const KEY_DERIVATION_METHODS: &[&str] = &["ARGON2I_MOD", "ARGON2I_INT", "RAW"];

/// How the agent manages the wallet key for a tenant.
///
/// Managed wallets keep the key in the tenant settings; unmanaged wallets
/// require the caller to supply the key on every token issuance or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyManagementMode {
    Managed,
    Unmanaged,
}

impl KeyManagementMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::Unmanaged => "unmanaged",
        }
    }
}

impl Default for KeyManagementMode {
    fn default() -> Self {
        Self::Managed
    }
}

/// Selects which webhook target set receives event notifications:
/// the tenant's own webhooks, the base wallet's, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletDispatchType {
    Default,
    Base,
    Both,
}

impl WalletDispatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Base => "base",
            Self::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "default" => Ok(Self::Default),
            "base" => Ok(Self::Base),
            "both" => Ok(Self::Both),
            other => Err(Error::Settings(format!(
                "Unsupported wallet dispatch type '{}'",
                other
            ))),
        }
    }
}

/// A WalletRecord represents one tenant sub-wallet under the agent.
///
/// The record owns the tenant's settings bag and the optional group
/// identifier used for filtered lookups. The wallet contents themselves
/// (keys, credentials) live with the host runtime, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Unique wallet identifier
    pub wallet_id: Uuid,

    /// Key management mode for this tenant
    pub key_management_mode: KeyManagementMode,

    /// Dotted-key settings applied when opening the tenant profile
    pub settings: WalletSettings,

    /// Optional opaque group identifier, filterable on list
    pub group_id: Option<String>,

    /// Issued-at of the most recent auth token, used by the host runtime
    /// to invalidate earlier tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_iat: Option<i64>,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl WalletRecord {
    /// Create a new wallet record from validated settings
    pub fn new(settings: WalletSettings, key_management_mode: KeyManagementMode) -> Self {
        let now = Utc::now();
        Self {
            wallet_id: Uuid::new_v4(),
            key_management_mode,
            settings,
            group_id: None,
            jwt_iat: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the group identifier
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn wallet_name(&self) -> Option<&str> {
        self.settings.get_str(settings::WALLET_NAME)
    }

    pub fn wallet_type(&self) -> Option<&str> {
        self.settings.get_str(settings::WALLET_TYPE)
    }

    pub fn wallet_key(&self) -> Option<&str> {
        self.settings.get_str(settings::WALLET_KEY)
    }

    /// Whether token issuance and removal require the caller to supply
    /// the wallet key
    pub fn requires_external_key(&self) -> bool {
        self.key_management_mode == KeyManagementMode::Unmanaged
    }

    /// Merge new settings into the record, bumping the update timestamp
    pub fn update_settings(&mut self, settings: WalletSettings) {
        self.settings.merge(settings);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> WalletSettings {
        let mut s = WalletSettings::new();
        s.insert(settings::WALLET_TYPE, "askar");
        s.insert(settings::WALLET_NAME, "my-wallet");
        s.insert(settings::WALLET_KEY, "secret");
        s
    }

    #[test]
    fn test_new_record_defaults() {
        let record = WalletRecord::new(base_settings(), KeyManagementMode::Managed);

        assert_eq!(record.wallet_name(), Some("my-wallet"));
        assert_eq!(record.wallet_type(), Some("askar"));
        assert!(record.group_id.is_none());
        assert!(record.jwt_iat.is_none());
        assert!(!record.requires_external_key());
    }

    #[test]
    fn test_with_group_id() {
        let record =
            WalletRecord::new(base_settings(), KeyManagementMode::Managed).with_group_id("NL");

        assert_eq!(record.group_id.as_deref(), Some("NL"));
    }

    #[test]
    fn test_unmanaged_requires_external_key() {
        let record = WalletRecord::new(base_settings(), KeyManagementMode::Unmanaged);

        assert!(record.requires_external_key());
    }

    #[test]
    fn test_update_settings_merges_and_touches_timestamp() {
        let mut record = WalletRecord::new(base_settings(), KeyManagementMode::Managed);
        let created = record.updated_at;

        let mut update = WalletSettings::new();
        update.insert(settings::DEFAULT_LABEL, "Alice");
        record.update_settings(update);

        assert_eq!(record.settings.get_str(settings::DEFAULT_LABEL), Some("Alice"));
        assert_eq!(record.wallet_name(), Some("my-wallet"));
        assert!(record.updated_at >= created);
    }

    #[test]
    fn test_dispatch_type_parse() {
        assert_eq!(
            WalletDispatchType::parse("base").unwrap(),
            WalletDispatchType::Base
        );
        assert!(WalletDispatchType::parse("everywhere").is_err());
    }
}
