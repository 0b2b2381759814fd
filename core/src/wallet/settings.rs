//! Wallet settings bag
//!
//! Settings are an open, dotted-key map of JSON values. The admin API maps
//! request fields onto these keys; the host runtime reads them when opening
//! the tenant profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wallet backend type, e.g. "askar"
pub const WALLET_TYPE: &str = "wallet.type";
/// Human-chosen wallet name, unique across tenants
pub const WALLET_NAME: &str = "wallet.name";
/// Master key used for key derivation. Never serialized to callers.
pub const WALLET_KEY: &str = "wallet.key";
/// Webhook URLs receiving events for this tenant
pub const WALLET_WEBHOOK_URLS: &str = "wallet.webhook_urls";
/// Which webhook target set receives events: default, base or both
pub const WALLET_DISPATCH_TYPE: &str = "wallet.dispatch_type";
/// Key derivation method for the wallet key
pub const WALLET_KEY_DERIVATION: &str = "wallet.key_derivation_method";
/// Label publicized to other agents when forming connections
pub const DEFAULT_LABEL: &str = "default_label";
/// Image URL publicized alongside the label
pub const IMAGE_URL: &str = "image_url";

/// Settings keys a tenant may override through `extra_settings`.
/// Anything else in the request object is dropped.
const PER_TENANT_SETTINGS: &[&str] = &[
    "log.level",
    "public_invites",
    "auto_ping_connection",
    "debug.invite_public",
    "debug.auto_accept_invites",
    "debug.auto_accept_requests",
    "debug.auto_respond_messages",
    "debug.monitor_ping",
    "endorser.auto_request",
    "endorser.auto_write",
    "endorser.auto_create_rev_reg",
];

/// Open settings map keyed by dotted setting names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletSettings(BTreeMap<String, Value>);

impl WalletSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a setting, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a setting as a string slice, if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge `other` into self. Keys present in both take the value
    /// from `other` (last writer wins).
    pub fn merge(&mut self, other: WalletSettings) {
        self.0.extend(other.0);
    }

    /// Copy of the settings with the secret wallet key removed.
    /// Every serialized response goes through this.
    pub fn without_wallet_key(&self) -> WalletSettings {
        let mut stripped = self.clone();
        stripped.0.remove(WALLET_KEY);
        stripped
    }
}

impl FromIterator<(String, Value)> for WalletSettings {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Filter a caller-supplied `extra_settings` object down to the per-tenant
/// allowlist. Unrecognized keys are dropped.
pub fn map_extra_settings(extra: &Map<String, Value>) -> WalletSettings {
    let mut settings = WalletSettings::new();
    for (key, value) in extra {
        if PER_TENANT_SETTINGS.contains(&key.as_str()) {
            settings.insert(key.clone(), value.clone());
        } else {
            tracing::debug!("Dropping unrecognized extra setting '{}'", key);
        }
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_last_writer_wins() {
        let mut settings = WalletSettings::new();
        settings.insert(WALLET_NAME, "first");
        settings.insert(DEFAULT_LABEL, "Alice");

        let mut update = WalletSettings::new();
        update.insert(WALLET_NAME, "second");

        settings.merge(update);

        assert_eq!(settings.get_str(WALLET_NAME), Some("second"));
        assert_eq!(settings.get_str(DEFAULT_LABEL), Some("Alice"));
    }

    #[test]
    fn test_without_wallet_key_strips_secret() {
        let mut settings = WalletSettings::new();
        settings.insert(WALLET_NAME, "w1");
        settings.insert(WALLET_KEY, "k1");

        let stripped = settings.without_wallet_key();

        assert!(!stripped.contains(WALLET_KEY));
        assert_eq!(stripped.get_str(WALLET_NAME), Some("w1"));
        // original is untouched
        assert_eq!(settings.get_str(WALLET_KEY), Some("k1"));
    }

    #[test]
    fn test_map_extra_settings_filters_allowlist() {
        let extra = json!({
            "log.level": "debug",
            "public_invites": true,
            "wallet.key": "sneaky",
            "not.a.setting": 1,
        });
        let mapped = map_extra_settings(extra.as_object().unwrap());

        assert_eq!(mapped.get_str("log.level"), Some("debug"));
        assert_eq!(mapped.get("public_invites"), Some(&json!(true)));
        assert!(!mapped.contains("wallet.key"));
        assert!(!mapped.contains("not.a.setting"));
    }

    #[test]
    fn test_settings_serialize_transparent() {
        let mut settings = WalletSettings::new();
        settings.insert(WALLET_NAME, "w1");
        settings.insert(WALLET_WEBHOOK_URLS, json!([]));

        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            value,
            json!({"wallet.name": "w1", "wallet.webhook_urls": []})
        );
    }
}
