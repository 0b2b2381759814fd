//! Server configuration
//!
//! All configuration comes from environment variables, read once at startup.

use std::path::PathBuf;

const DEFAULT_ADMIN_PORT: u16 = 8031;
const DEFAULT_BASE_WALLET_TYPE: &str = "askar";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 8;

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Runtime configuration snapshot for the admin server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding the wallet store file
    pub data_dir: PathBuf,
    /// Port the admin API listens on
    pub admin_port: u16,
    /// Wallet type of the base (root) wallet; sub-wallets must match it
    pub base_wallet_type: String,
    /// Lifetime of issued tenant tokens
    pub token_ttl_hours: i64,
    /// Endorser alias to configure on new tenants, when set
    pub endorser_alias: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let data_dir = env_string("WG_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".wg-data"));
        let admin_port = env_string("WG_ADMIN_PORT")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_ADMIN_PORT);
        let base_wallet_type = env_string("WG_BASE_WALLET_TYPE")
            .unwrap_or_else(|| DEFAULT_BASE_WALLET_TYPE.to_string());
        let token_ttl_hours = env_string("WG_TOKEN_TTL_HOURS")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        let endorser_alias = env_string("WG_ENDORSER_ALIAS");

        Self {
            data_dir,
            admin_port,
            base_wallet_type,
            token_ttl_hours,
            endorser_alias,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".wg-data"),
            admin_port: DEFAULT_ADMIN_PORT,
            base_wallet_type: DEFAULT_BASE_WALLET_TYPE.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            endorser_alias: None,
        }
    }
}
