//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet with name {0} already exists")]
    DuplicateWalletName(String),

    #[error("Missing wallet key: {0}")]
    WalletKeyMissing(String),

    #[error("Invalid wallet settings: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Token error: {0}")]
    Token(String),
}
