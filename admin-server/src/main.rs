//! Admin server for multitenancy wallet management
//!
//! Serves the tenant wallet administration API: query, create, update,
//! token issuance and removal of sub-wallets, with group-tag filtering.

mod auth;
mod config;
mod multitenant;
mod routes;
mod state;

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admin_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("Using data directory: {:?}", config.data_dir);

    let app_state = AppState::new(config.clone())
        .await
        .expect("Failed to initialize application state");

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::wallets::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.admin_port));
    tracing::info!("Admin API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
