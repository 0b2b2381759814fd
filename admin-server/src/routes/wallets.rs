//! Multitenancy wallet admin endpoints
//!
//! The tenant admin surface: query/get/create/update sub-wallets, plus the
//! token-issuance and removal endpoints, all delegating wallet lifecycle to
//! the injected multitenant manager.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use wg_core::wallet::{
    map_extra_settings, settings, KeyManagementMode, Pagination, WalletQuery, WalletRecord,
    WalletSettings, DEFAULT_PAGE_SIZE,
};
use wg_core::Error;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type RouteError = (StatusCode, Json<ErrorResponse>);

fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

fn not_found(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::NOT_FOUND, error)
}

fn forbidden(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::FORBIDDEN, error)
}

fn unauthorized(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, error)
}

/// Storage and model errors surface as 400, a missing record as 404
fn map_wallet_error(err: Error) -> RouteError {
    match err {
        Error::WalletNotFound(_) => not_found(err.to_string()),
        other => bad_request(other.to_string()),
    }
}

/// Token and remove endpoints additionally answer 401 for a missing
/// wallet key on unmanaged wallets
fn map_key_error(err: Error) -> RouteError {
    match err {
        Error::WalletKeyMissing(_) => unauthorized(err.to_string()),
        other => map_wallet_error(other),
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WalletListQueryParams {
    #[serde(default)]
    pub wallet_name: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub descending: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    #[serde(default)]
    pub wallet_name: Option<String>,
    #[serde(default)]
    pub wallet_key: Option<String>,
    #[serde(default)]
    pub wallet_type: Option<String>,
    #[serde(default)]
    pub key_management_mode: Option<KeyManagementMode>,
    #[serde(default)]
    pub wallet_webhook_urls: Option<Vec<String>>,
    #[serde(default)]
    pub wallet_dispatch_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub wallet_key_derivation: Option<String>,
    #[serde(default)]
    pub extra_settings: Option<Map<String, Value>>,
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWalletRequest {
    #[serde(default)]
    pub wallet_webhook_urls: Option<Vec<String>>,
    #[serde(default)]
    pub wallet_dispatch_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub extra_settings: Option<Map<String, Value>>,
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WalletKeyRequest {
    #[serde(default)]
    pub wallet_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletRecordResponse {
    pub wallet_id: Uuid,
    pub key_management_mode: KeyManagementMode,
    pub settings: WalletSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WalletListResponse {
    pub results: Vec<WalletRecordResponse>,
}

#[derive(Debug, Serialize)]
pub struct CreateWalletResponse {
    #[serde(flatten)]
    pub record: WalletRecordResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct RemoveWalletResponse {}

/// Serialize a wallet record for a caller.
///
/// The secret wallet key is always stripped from the settings; the group
/// identifier surfaces as a top-level field when set.
fn format_wallet_record(record: &WalletRecord) -> WalletRecordResponse {
    WalletRecordResponse {
        wallet_id: record.wallet_id,
        key_management_mode: record.key_management_mode,
        settings: record.settings.without_wallet_key(),
        group_id: record.group_id.clone().filter(|group| !group.is_empty()),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn wallets_list(
    State(state): State<AppState>,
    Query(params): Query<WalletListQueryParams>,
) -> Result<Json<WalletListResponse>, RouteError> {
    let query = WalletQuery {
        wallet_name: params.wallet_name.filter(|name| !name.is_empty()),
        group_id: params.group_id.filter(|group| !group.is_empty()),
    };
    let page = Pagination {
        limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        offset: params.offset.unwrap_or(0),
        descending: params.descending.unwrap_or(false),
    };

    let records = state
        .wallet_store()
        .query(&query, &page)
        .await
        .map_err(|err| bad_request(err.to_string()))?;

    Ok(Json(WalletListResponse {
        results: records.iter().map(format_wallet_record).collect(),
    }))
}

async fn wallet_get(
    State(state): State<AppState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<WalletRecordResponse>, RouteError> {
    let record = state
        .wallet_store()
        .retrieve(wallet_id)
        .await
        .map_err(map_wallet_error)?;

    Ok(Json(format_wallet_record(&record)))
}

async fn wallet_create(
    State(state): State<AppState>,
    Json(req): Json<CreateWalletRequest>,
) -> Result<Json<CreateWalletResponse>, RouteError> {
    let config = state.config();

    let sub_wallet_type = req
        .wallet_type
        .unwrap_or_else(|| config.base_wallet_type.clone());
    if sub_wallet_type != config.base_wallet_type {
        return Err(forbidden(format!(
            "Wallet type '{}' does not match the base wallet type '{}'",
            sub_wallet_type, config.base_wallet_type
        )));
    }

    let key_management_mode = req.key_management_mode.unwrap_or_default();
    let wallet_webhook_urls = req.wallet_webhook_urls.unwrap_or_default();
    let mut wallet_dispatch_type = req
        .wallet_dispatch_type
        .unwrap_or_else(|| "default".to_string());
    // If no webhooks specified, dispatch only to base webhook targets
    if wallet_webhook_urls.is_empty() {
        wallet_dispatch_type = "base".to_string();
    }

    let mut settings_bag = WalletSettings::new();
    settings_bag.insert(settings::WALLET_TYPE, sub_wallet_type);
    if let Some(name) = req.wallet_name {
        settings_bag.insert(settings::WALLET_NAME, name);
    }
    if let Some(key) = &req.wallet_key {
        settings_bag.insert(settings::WALLET_KEY, key.clone());
    }
    settings_bag.insert(settings::WALLET_WEBHOOK_URLS, wallet_webhook_urls);
    settings_bag.insert(settings::WALLET_DISPATCH_TYPE, wallet_dispatch_type);

    if let Some(label) = req.label.filter(|label| !label.is_empty()) {
        settings_bag.insert(settings::DEFAULT_LABEL, label);
    }
    if let Some(image_url) = req.image_url.filter(|url| !url.is_empty()) {
        settings_bag.insert(settings::IMAGE_URL, image_url);
    }
    // Absent means lower levels pick the default derivation
    if let Some(derivation) = req.wallet_key_derivation.filter(|kd| !kd.is_empty()) {
        settings_bag.insert(settings::WALLET_KEY_DERIVATION, derivation);
    }
    if let Some(extra) = &req.extra_settings {
        settings_bag.merge(map_extra_settings(extra));
    }

    let manager = state.multitenant_mgr();
    let mut record = manager
        .create_wallet(settings_bag, key_management_mode)
        .await
        .map_err(|err| bad_request(err.to_string()))?;

    // Attach the group identifier after the create returns; the record is
    // the manager's to construct, the tag is ours to set
    if let Some(group_id) = req.group_id.filter(|group| !group.is_empty()) {
        record.group_id = Some(group_id);
        record = state
            .wallet_store()
            .save(record)
            .await
            .map_err(|err| bad_request(err.to_string()))?;
    }

    let token = manager
        .create_auth_token(&record, req.wallet_key.as_deref())
        .await
        .map_err(|err| bad_request(err.to_string()))?;

    manager
        .attempt_endorser_setup(&record)
        .await
        .map_err(|err| bad_request(err.to_string()))?;

    Ok(Json(CreateWalletResponse {
        record: format_wallet_record(&record),
        token,
    }))
}

async fn wallet_update(
    State(state): State<AppState>,
    Path(wallet_id): Path<Uuid>,
    Json(req): Json<UpdateWalletRequest>,
) -> Result<Json<WalletRecordResponse>, RouteError> {
    let UpdateWalletRequest {
        wallet_webhook_urls,
        mut wallet_dispatch_type,
        label,
        image_url,
        extra_settings,
        group_id,
    } = req;

    if wallet_webhook_urls.is_none()
        && wallet_dispatch_type.is_none()
        && label.is_none()
        && image_url.is_none()
        && extra_settings.is_none()
        && group_id.is_none()
    {
        return Err(bad_request("At least one parameter is required."));
    }

    // Adjust dispatch type according to the webhook urls
    if let Some(urls) = &wallet_webhook_urls {
        if urls.is_empty() {
            wallet_dispatch_type = Some("base".to_string());
        } else if wallet_dispatch_type.is_none() {
            wallet_dispatch_type = Some("default".to_string());
        }
    }

    // Only parameters present in the request are updated
    let mut settings_bag = WalletSettings::new();
    if let Some(urls) = wallet_webhook_urls {
        settings_bag.insert(settings::WALLET_WEBHOOK_URLS, urls);
    }
    if let Some(dispatch) = wallet_dispatch_type {
        settings_bag.insert(settings::WALLET_DISPATCH_TYPE, dispatch);
    }
    if let Some(label) = label {
        settings_bag.insert(settings::DEFAULT_LABEL, label);
    }
    if let Some(image_url) = image_url {
        settings_bag.insert(settings::IMAGE_URL, image_url);
    }
    if let Some(extra) = &extra_settings {
        settings_bag.merge(map_extra_settings(extra));
    }

    let mut record = state
        .multitenant_mgr()
        .update_wallet(wallet_id, settings_bag)
        .await
        .map_err(map_wallet_error)?;

    if let Some(group_id) = group_id {
        record.group_id = Some(group_id);
        record = state
            .wallet_store()
            .save(record)
            .await
            .map_err(map_wallet_error)?;
    }

    Ok(Json(format_wallet_record(&record)))
}

async fn wallet_create_token(
    State(state): State<AppState>,
    Path(wallet_id): Path<Uuid>,
    body: Option<Json<WalletKeyRequest>>,
) -> Result<Json<TokenResponse>, RouteError> {
    let wallet_key = body.and_then(|Json(req)| req.wallet_key);

    let record = state
        .wallet_store()
        .retrieve(wallet_id)
        .await
        .map_err(map_wallet_error)?;

    let token = state
        .multitenant_mgr()
        .create_auth_token(&record, wallet_key.as_deref())
        .await
        .map_err(map_key_error)?;

    Ok(Json(TokenResponse { token }))
}

async fn wallet_remove(
    State(state): State<AppState>,
    Path(wallet_id): Path<Uuid>,
    body: Option<Json<WalletKeyRequest>>,
) -> Result<Json<RemoveWalletResponse>, RouteError> {
    let wallet_key = body.and_then(|Json(req)| req.wallet_key);

    state
        .multitenant_mgr()
        .remove_wallet(wallet_id, wallet_key.as_deref())
        .await
        .map_err(map_key_error)?;

    Ok(Json(RemoveWalletResponse {}))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/multitenancy/wallets", get(wallets_list))
        .route("/multitenancy/wallet", post(wallet_create))
        .route(
            "/multitenancy/wallet/{wallet_id}",
            get(wallet_get).put(wallet_update),
        )
        .route(
            "/multitenancy/wallet/{wallet_id}/token",
            post(wallet_create_token),
        )
        .route(
            "/multitenancy/wallet/{wallet_id}/remove",
            post(wallet_remove),
        )
}
