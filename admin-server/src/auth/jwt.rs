use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a tenant auth token.
///
/// Unmanaged wallets embed their wallet key so the host runtime can open
/// the wallet from the token alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletJwtClaims {
    pub sub: String,
    pub wallet_id: String,
    pub iat: i64,
    pub exp: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_key: Option<String>,
}

fn jwt_secret() -> String {
    std::env::var("WG_JWT_SECRET").unwrap_or_else(|_| "dev-jwt-secret-change-me".to_string())
}

fn wallet_validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation
}

/// Issue a tenant JWT. Returns the token together with its issued-at,
/// which the caller records on the wallet record.
pub fn issue_wallet_jwt(
    wallet_id: &str,
    wallet_key: Option<&str>,
    ttl_hours: i64,
) -> Result<(String, i64), String> {
    let now = Utc::now();
    let iat = now.timestamp();
    let exp = (now + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = WalletJwtClaims {
        sub: format!("wallet:{}", wallet_id),
        wallet_id: wallet_id.to_string(),
        iat,
        exp,
        wallet_key: wallet_key.map(str::to_string),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map(|token| (token, iat))
    .map_err(|err| format!("Failed to sign wallet JWT: {}", err))
}

pub fn verify_wallet_jwt(token: &str) -> Result<WalletJwtClaims, String> {
    decode::<WalletJwtClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &wallet_validation(),
    )
    .map(|decoded| decoded.claims)
    .map_err(|err| format!("Invalid wallet JWT: {}", err))
}
