//! Tenant auth token primitives

mod jwt;

pub use jwt::{issue_wallet_jwt, verify_wallet_jwt, WalletJwtClaims};
