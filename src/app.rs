use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    routes,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

/// Wires the routes around an already-open pool. The caller owns the pool's
/// lifecycle.
pub fn build(config: &AppConfig, pool: PgPool) -> Result<Router> {
    let state = AppState { db: pool };

    let allowed_origin = config
        .cors
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|_| {
            AppError::ConfigError(format!(
                "Invalid CORS origin: {}",
                config.cors.allowed_origin
            ))
        })?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_origin(allowed_origin)
        .allow_credentials(true);

    let app = routes::create_router()
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
