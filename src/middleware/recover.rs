//! Panic recovery boundary
//!
//! Converts an unexpected fault anywhere in the guard chain or a business
//! handler into the uniform internal-error response carrying only the
//! request's correlation id. Anticipated rejections are ordinary `ApiError`
//! values and never pass through here; this is a last resort.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;

use crate::context::RequestId;
use crate::error::ApiError;

pub async fn recover(request: Request, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());

            // Detail stays in the local log; the response exposes only the
            // correlation id.
            tracing::error!(request_id = %request_id, panic = %detail, "request panicked");

            ApiError::Internal { request_id }.into_response()
        }
    }
}
