//! Middleware for the gateway
//!
//! Each guard of the request pipeline lives in its own module: security
//! headers and request correlation, availability gates (maintenance mode,
//! IP allow-list, payload ceiling), rate limiting, authentication,
//! authorization, tenant scoping, compliance checks, audit capture, and the
//! panic recovery boundary.

pub mod access;
pub mod audit;
pub mod auth;
pub mod authorize;
pub mod compliance;
pub mod rate_limiter;
pub mod recover;
pub mod security;
pub mod tenant;

pub use access::{ip_allowlist, maintenance_mode};
pub use audit::audit;
pub use auth::authenticate;
pub use authorize::require_role;
pub use compliance::transaction_limits;
pub use rate_limiter::{rate_limit_layer, SlidingWindow};
pub use recover::recover;
pub use security::{request_id, request_size_limit, security_headers};
pub use tenant::bank_access;

use axum::{body::Body, extract::ConnectInfo, http::Request};
use std::net::SocketAddr;

/// Extract the client identity key from a request.
///
/// Proxy headers take precedence over the socket address so the limiter and
/// allow-list see the real caller behind a reverse proxy.
pub(crate) fn client_ip(request: &Request<Body>) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(ip) = s.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return ip.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(s) = real_ip.to_str() {
            return s.trim().to_string();
        }
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let request = Request::builder()
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "10.0.0.2");
    }

    #[test]
    fn test_client_ip_unknown_without_headers() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request), "unknown");
    }
}
