//! Tenant scoping middleware
//!
//! Callers may only touch their own bank's data. When a route carries a
//! `bank_id` path parameter it must match the authenticated caller's tenant;
//! when it doesn't, the caller's own tenant is recorded in context so
//! handlers never have to trust caller-supplied identifiers for listing
//! or query operations.

use axum::{
    extract::{RawPathParams, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::Claims;
use crate::context::TenantScope;
use crate::error::ApiError;

pub async fn bank_access(
    params: Option<RawPathParams>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(claims) = request.extensions().get::<Claims>() else {
        return ApiError::MissingIdentity.into_response();
    };

    let path_bank_id = params
        .as_ref()
        .and_then(|params| {
            params
                .iter()
                .find(|(name, _)| *name == "bank_id")
                .map(|(_, value)| value)
        });

    if let Some(path_bank_id) = path_bank_id {
        if path_bank_id != claims.bank_id {
            tracing::warn!(
                caller_bank = %claims.bank_id,
                requested_bank = %path_bank_id,
                "cross-tenant access attempt"
            );
            return ApiError::CrossTenantAccess.into_response();
        }
    }

    let scope = TenantScope {
        bank_id: claims.bank_id.clone(),
    };
    request.extensions_mut().insert(scope);

    next.run(request).await
}
