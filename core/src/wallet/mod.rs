//! Wallet (tenant) records, settings and storage

pub mod model;
pub mod settings;
pub mod store;

pub use model::{
    KeyManagementMode, WalletDispatchType, WalletRecord, KEY_DERIVATION_METHODS,
};
pub use settings::{map_extra_settings, WalletSettings};
pub use store::{Pagination, WalletQuery, WalletStore, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
