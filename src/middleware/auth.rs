//! Authentication middleware
//!
//! Extracts and verifies the bearer token, attaching the typed [`Claims`]
//! to the request context. Missing and malformed credentials are distinct
//! rejections from signature and expiry failures.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::auth::{verify_token, Claims, JwtError};
use crate::error::ApiError;

/// Middleware guarding authenticated routes.
///
/// On success the verified claims travel with the request; a copy is also
/// placed on the response so the audit recorder, which sits outside this
/// guard, can attribute the outcome.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match extract_claims(request.headers(), &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(claims.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(claims);
    response
}

fn extract_claims(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::MissingCredential)?;

    let raw = header_value
        .to_str()
        .map_err(|_| ApiError::MalformedCredential)?;

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(ApiError::MalformedCredential)?;

    verify_token(token, secret).map_err(|err| match err {
        JwtError::Expired => ApiError::Expired,
        JwtError::InvalidSignature | JwtError::DisallowedAlgorithm | JwtError::Malformed(_) => {
            ApiError::InvalidSignature
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{sign_claims, Role};
    use axum::http::HeaderValue;
    use chrono::Utc;
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn valid_token() -> String {
        let now = Utc::now().timestamp();
        sign_claims(
            &Claims {
                sub: Uuid::new_v4(),
                role: Role::Sme,
                bank_id: "chase".to_string(),
                iat: now,
                exp: now + 3600,
            },
            SECRET,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_claims(&headers, SECRET),
            Err(ApiError::MissingCredential)
        ));
    }

    #[test]
    fn test_missing_bearer_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Token abc123"),
        );
        assert!(matches!(
            extract_claims(&headers, SECRET),
            Err(ApiError::MalformedCredential)
        ));
    }

    #[test]
    fn test_valid_token_yields_claims() {
        let headers = bearer_headers(&valid_token());
        let claims = extract_claims(&headers, SECRET).unwrap();
        assert_eq!(claims.role, Role::Sme);
        assert_eq!(claims.bank_id, "chase");
    }

    #[test]
    fn test_wrong_secret_maps_to_invalid_signature() {
        let headers = bearer_headers(&valid_token());
        assert!(matches!(
            extract_claims(&headers, "other-secret"),
            Err(ApiError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_maps_to_expired() {
        let now = Utc::now().timestamp();
        let token = sign_claims(
            &Claims {
                sub: Uuid::new_v4(),
                role: Role::Sme,
                bank_id: "chase".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            },
            SECRET,
        )
        .unwrap();

        let headers = bearer_headers(&token);
        assert!(matches!(
            extract_claims(&headers, SECRET),
            Err(ApiError::Expired)
        ));
    }
}
