//! Centralized API error handling for the gateway
//!
//! Every guard in the request pipeline resolves its rejection to one of the
//! variants below. Each variant maps to exactly one HTTP status code and one
//! flat JSON body shape with stable field names.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::Role;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authorization header required")]
    MissingCredential,

    #[error("Bearer token required")]
    MalformedCredential,

    #[error("Invalid token")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Role information not found")]
    MissingIdentity,

    #[error("Insufficient privileges")]
    InsufficientRole { required: Vec<Role>, actual: Role },

    #[error("Access denied to bank data")]
    CrossTenantAccess,

    #[error("IP address not allowed")]
    IpNotAllowed,

    #[error("Rate limit exceeded")]
    RateLimited { limit: usize, window_secs: u64 },

    #[error("Transaction amount exceeds allowed limit")]
    LimitExceeded { limit: f64, amount: f64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request payload too large")]
    PayloadTooLarge { max_size: u64, received: u64 },

    #[error("Service temporarily unavailable")]
    Maintenance,

    #[error("Internal server error")]
    Internal { request_id: String },
}

impl ApiError {
    /// Stable error code, used as the log label for rejections.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingCredential => "MISSING_CREDENTIAL",
            ApiError::MalformedCredential => "MALFORMED_CREDENTIAL",
            ApiError::InvalidSignature => "INVALID_SIGNATURE",
            ApiError::Expired => "EXPIRED",
            ApiError::MissingIdentity => "MISSING_IDENTITY",
            ApiError::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            ApiError::CrossTenantAccess => "CROSS_TENANT_ACCESS",
            ApiError::IpNotAllowed => "IP_NOT_ALLOWED",
            ApiError::RateLimited { .. } => "RATE_LIMITED",
            ApiError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::Maintenance => "MAINTENANCE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredential
            | ApiError::MalformedCredential
            | ApiError::InvalidSignature
            | ApiError::Expired => StatusCode::UNAUTHORIZED,
            ApiError::MissingIdentity
            | ApiError::InsufficientRole { .. }
            | ApiError::CrossTenantAccess
            | ApiError::IpNotAllowed => StatusCode::FORBIDDEN,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::LimitExceeded { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Maintenance => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Flat JSON body. The `error` field is always present; context fields
    /// carry non-sensitive numeric or name data only.
    fn body(&self) -> serde_json::Value {
        let message = self.to_string();
        match self {
            ApiError::InsufficientRole { required, actual } => json!({
                "error": message,
                "required_roles": required,
                "user_role": actual,
            }),
            ApiError::RateLimited { limit, window_secs } => json!({
                "error": message,
                "message": format!("Maximum {limit} requests per {window_secs}s allowed"),
                "limit": limit,
                "window_seconds": window_secs,
            }),
            ApiError::LimitExceeded { limit, amount } => json!({
                "error": message,
                "limit": limit,
                "amount": amount,
            }),
            ApiError::PayloadTooLarge { max_size, received } => json!({
                "error": message,
                "max_size": max_size,
                "received": received,
            }),
            ApiError::Maintenance => json!({
                "error": message,
                "message": "Service is currently under maintenance",
                "status": "maintenance_mode",
            }),
            ApiError::Internal { request_id } => json!({
                "error": message,
                "message": "An unexpected error occurred",
                "request_id": request_id,
            }),
            _ => json!({ "error": message }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        match &self {
            ApiError::Internal { request_id } => {
                tracing::error!(code = %code, request_id = %request_id, "server error occurred");
            }
            _ => {
                tracing::debug!(code = %code, error = %self, "request rejected");
            }
        }

        let mut response = (status, Json(self.body())).into_response();

        if let ApiError::RateLimited { window_secs, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&window_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {}", err))
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::MissingCredential.error_code(), "MISSING_CREDENTIAL");
        assert_eq!(ApiError::CrossTenantAccess.error_code(), "CROSS_TENANT_ACCESS");
        assert_eq!(
            ApiError::RateLimited { limit: 100, window_secs: 60 }.error_code(),
            "RATE_LIMITED"
        );
        assert_eq!(
            ApiError::Internal { request_id: "abc".to_string() }.error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingCredential.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MalformedCredential.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidSignature.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingIdentity.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::CrossTenantAccess.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::RateLimited { limit: 1, window_secs: 1 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::LimitExceeded { limit: 1.0, amount: 2.0 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PayloadTooLarge { max_size: 1, received: 2 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ApiError::Maintenance.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::Internal { request_id: String::new() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_insufficient_role_body_lists_roles() {
        let err = ApiError::InsufficientRole {
            required: vec![Role::Admin, Role::BankAdmin],
            actual: Role::Sme,
        };
        let body = err.body();
        assert_eq!(body["error"], "Insufficient privileges");
        assert_eq!(body["required_roles"], json!(["admin", "bank_admin"]));
        assert_eq!(body["user_role"], "sme");
    }

    #[test]
    fn test_limit_exceeded_body_reports_numbers() {
        let err = ApiError::LimitExceeded { limit: 1_000_000.0, amount: 1_000_001.0 };
        let body = err.body();
        assert_eq!(body["limit"], 1_000_000.0);
        assert_eq!(body["amount"], 1_000_001.0);
    }

    #[test]
    fn test_internal_body_carries_only_request_id() {
        let err = ApiError::Internal { request_id: "req-1".to_string() };
        let body = err.body();
        assert_eq!(body["request_id"], "req-1");
        // No stack or panic detail may ever leak into the body.
        assert!(body.get("panic").is_none());
        assert!(body.get("detail").is_none());
    }
}
