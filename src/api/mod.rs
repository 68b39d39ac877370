use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod activitypub;
mod admin;
pub mod auth;
mod error;
mod observability;
mod signup;
mod types;
pub mod validation;

pub use auth::Principal;
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let spv1 = Router::new()
        .route("/login", post(auth::login))
        .route("/signup-token", get(signup::signup_token))
        .route("/signup", post(signup::signup))
        .route("/login-account", get(auth::login_account))
        .route("/account-info", get(auth::account_info))
        .route(
            "/admin/signup-policy",
            get(admin::get_signup_policy).put(admin::put_signup_policy),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::bearer_middleware,
        ));

    let mut app = Router::new()
        .nest("/spv1", spv1)
        .route("/ap/{pun}", get(activitypub::get_actor))
        .route("/health", get(observability::health));

    if state.prometheus_handle.is_some() {
        app = app.route("/metrics", get(observability::get_metrics));
    }

    app.route_layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
