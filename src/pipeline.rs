//! Pipeline composer
//!
//! Builds the router and applies every cross-cutting guard in its fixed
//! order. Reading the layers bottom-up gives the execution order for a
//! request: security headers → request id → audit start → recovery →
//! maintenance → IP allow-list → payload ceiling → rate limit → routing →
//! authentication → authorization → tenant scope → compliance → handler,
//! with audit completion and header stamping on the way back out.
//!
//! A guard that rejects returns its response without calling the next
//! stage, so everything inside it is skipped while the outer stages still
//! observe and decorate the outcome.

use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::AppState;
use crate::handlers;
use crate::middleware;
use crate::routes;

/// Build the production application router.
pub fn app(state: AppState) -> Router {
    let api = routes::api_routes(state.clone());
    compose(state, api)
}

/// Wrap an API route set with the full guard chain.
///
/// Split out from [`app`] so tests can drive the identical pipeline around
/// purpose-built routes.
pub fn compose(state: AppState, api: Router<AppState>) -> Router {
    let api = api.layer(from_fn_with_state(state.clone(), middleware::authenticate));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .layer(from_fn(middleware::rate_limit_layer(
            state.rate_limiter.clone(),
        )))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_size_limit,
        ))
        .layer(from_fn_with_state(state.clone(), middleware::ip_allowlist))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::maintenance_mode,
        ))
        .layer(from_fn(middleware::recover))
        .layer(from_fn_with_state(state.clone(), middleware::audit))
        .layer(from_fn(middleware::request_id))
        .layer(from_fn(middleware::security_headers))
        .layer(cors_layer(state.config.cors_allowed_origins.as_deref()))
        .with_state(state)
}

fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let Some(origins) = allowed_origins.filter(|s| !s.is_empty()) else {
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new().allow_origin(origins).allow_headers(Any)
}
