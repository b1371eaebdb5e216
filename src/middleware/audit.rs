//! Audit capture middleware
//!
//! Spans the request: the start-side fields are captured before any
//! rejecting guard runs, and the event is completed with outcome, latency,
//! and response size regardless of how the request ended.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::time::Instant;

use crate::app_state::AppState;
use crate::audit::AuditEvent;
use crate::auth::Claims;
use crate::context::RequestId;
use crate::middleware::client_ip;

pub async fn audit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let timestamp = Utc::now();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let client = client_ip(&request);
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone());

    let response = next.run(request).await;

    // The authentication guard mirrors verified claims onto the response so
    // the outcome can be attributed even though the guard runs inside us.
    let user_id = response.extensions().get::<Claims>().map(|c| c.sub);

    let response_bytes = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    state.audit.record(AuditEvent {
        method,
        path,
        client_ip: client,
        user_agent,
        timestamp,
        user_id,
        request_id,
        status: response.status().as_u16(),
        latency_ms: start.elapsed().as_millis() as u64,
        response_bytes,
    });

    response
}
