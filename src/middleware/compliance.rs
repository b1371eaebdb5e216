//! Compliance middleware
//!
//! Transaction-amount enforcement for the operational allow-list of
//! transaction-initiating endpoints. Amounts above the hard ceiling are
//! rejected; amounts at or above the suspicious-activity threshold are
//! admitted but flagged for manual review. Other paths skip this guard
//! entirely.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::context::ComplianceFlags;
use crate::error::ApiError;

/// Paths subject to transaction limits (matched by substring membership).
const TRANSACTION_ENDPOINTS: &[&str] = &[
    "/payments/process",
    "/payments/bulk-process",
    "/transfers/initiate",
    "/transfers/bulk-transfer",
    "/financing/disburse",
];

/// The only body field this guard inspects. Full payload validation stays
/// with the business handlers.
#[derive(Debug, Deserialize)]
struct TransactionProbe {
    amount: Option<f64>,
}

pub async fn transaction_limits(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !is_transaction_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    // Buffer the body so it can be inspected here and replayed for the
    // handler. The size ceiling was already enforced upstream; the limit
    // here is a backstop for requests without a Content-Length.
    let (mut parts, body) = request.into_parts();
    let bytes = match to_bytes(body, state.config.max_body_bytes as usize).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return ApiError::BadRequest("failed to read request body".to_string())
                .into_response()
        }
    };

    let mut flags = ComplianceFlags::default();

    if let Ok(probe) = serde_json::from_slice::<TransactionProbe>(&bytes) {
        if let Some(amount) = probe.amount {
            let limit = state.config.max_transaction_amount;
            if amount > limit {
                return ApiError::LimitExceeded { limit, amount }.into_response();
            }

            if amount >= state.config.suspicious_activity_threshold {
                tracing::info!(amount, "transaction flagged for manual review");
                flags = ComplianceFlags {
                    suspicious_activity: true,
                    requires_manual_review: true,
                };
            }
        }
    }

    parts.extensions.insert(flags);
    let request = Request::from_parts(parts, Body::from(bytes));

    next.run(request).await
}

fn is_transaction_endpoint(path: &str) -> bool {
    TRANSACTION_ENDPOINTS
        .iter()
        .any(|endpoint| path.contains(endpoint))
}
