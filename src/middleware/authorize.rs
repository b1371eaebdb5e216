//! Role-based authorization middleware
//!
//! Role membership only; resource ownership is the tenant guard's concern.

use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{Claims, Role};
use crate::error::ApiError;

/// Create a middleware admitting only the listed roles.
///
/// Absent claims mean the authentication guard did not run or did not
/// succeed; that contract violation is itself a rejection, never a crash.
pub fn require_role(
    required: &'static [Role],
) -> impl Fn(
    Request<Body>,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send {
    move |request: Request<Body>, next: Next| {
        Box::pin(async move {
            let Some(claims) = request.extensions().get::<Claims>() else {
                return ApiError::MissingIdentity.into_response();
            };

            if !required.contains(&claims.role) {
                return ApiError::InsufficientRole {
                    required: required.to_vec(),
                    actual: claims.role,
                }
                .into_response();
            }

            next.run(request).await
        })
    }
}
