pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod response;
pub mod routes;
pub mod rules;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::SystemMailer;
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> Router {
    let system_mailer = config.smtp.as_ref().and_then(|smtp| {
        match SystemMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("System SMTP configured");
                Some(Arc::new(mailer))
            }
            Err(e) => {
                tracing::warn!("System SMTP not available: {e}");
                None
            }
        }
    });

    let upload_dir = config.upload_dir.clone();
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        system_mailer,
        http: reqwest::Client::new(),
        login_limiter: LoginRateLimiter::new(),
    });

    // Expired rate-limit windows accumulate otherwise
    let limiter_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(10 * 60));
        loop {
            interval.tick().await;
            limiter_state
                .login_limiter
                .cleanup(std::time::Duration::from_secs(30 * 60));
        }
    });

    Router::new()
        .merge(routes::api_routes())
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
