//! Core library for the wallet-groups multitenancy admin service
//!
//! This crate contains the core business logic, including:
//! - Wallet (tenant) record model and settings
//! - Wallet storage
//! - The multitenant manager interface

pub mod error;
pub mod multitenant;
pub mod wallet;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
