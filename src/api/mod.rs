use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, Argon2PasswordHasher, DefaultAccountService, JwtTokenIssuer,
};
use metrics_exporter_prometheus::PrometheusHandle;

mod error;
mod observability;
mod types;
pub mod users;
mod validation;

pub use error::{ApiError, INTERNAL_ERROR_MESSAGE};
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub account_service: Arc<dyn AccountService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn accounts(&self) -> &dyn AccountService {
        self.account_service.as_ref()
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }
}

/// Connects the store and wires the account service from `config`.
pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    config.validate()?;

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let hasher = Argon2PasswordHasher::new(&config.security)
        .map_err(|e| anyhow::anyhow!("Failed to configure password hasher: {e}"))?;
    let tokens = JwtTokenIssuer::from_config(&config.security)
        .map_err(|e| anyhow::anyhow!("Failed to configure token issuer: {e}"))?;

    let account_service = Arc::new(
        DefaultAccountService::new(Arc::new(store.clone()), Arc::new(hasher), Arc::new(tokens))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to prepare login hash: {e}"))?,
    ) as Arc<dyn AccountService>;

    Ok(Arc::new(AppState {
        config,
        store,
        account_service,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = &state.config.server.cors_allowed_origins;
    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/{username}", put(users::rename))
        .route("/health", get(observability::health))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
