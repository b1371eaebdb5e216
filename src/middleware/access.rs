//! Availability gates: maintenance mode and the IP allow-list

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::Ordering;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::client_ip;

/// While maintenance mode is enabled every path except `/health` is refused.
pub async fn maintenance_mode(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.maintenance.load(Ordering::Relaxed) && request.uri().path() != "/health" {
        return ApiError::Maintenance.into_response();
    }

    next.run(request).await
}

/// Restrict access to allow-listed client addresses.
///
/// The check is a no-op when no allow-list is configured; `/health` stays
/// reachable for probes either way.
pub async fn ip_allowlist(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let allowlist = &state.config.ip_allowlist;

    if allowlist.is_empty() || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let client = client_ip(&request);
    if !allowlist.iter().any(|allowed| allowed == &client) {
        tracing::warn!(client = %client, "request from non-allow-listed address");
        return ApiError::IpNotAllowed.into_response();
    }

    next.run(request).await
}
