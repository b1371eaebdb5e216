//! JWT claim verification
//!
//! Decodes and verifies the signed identity token carried in the
//! `Authorization` header. The signing algorithm is pinned to HS256; a token
//! declaring any other algorithm fails verification regardless of its
//! signature, which closes the algorithm-substitution hole.

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// JWT-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum JwtError {
    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token declares a disallowed signing algorithm")]
    DisallowedAlgorithm,

    #[error("Token expired")]
    Expired,

    #[error("Token malformed: {0}")]
    Malformed(String),
}

/// User roles known to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Small/medium enterprise submitting invoices for financing
    Sme,
    /// Invoice buyer/customer
    Buyer,
    /// Financial institution operator
    Bank,
    /// Bank-side administrator
    BankAdmin,
    /// Platform administrator
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sme => "sme",
            Role::Buyer => "buyer",
            Role::Bank => "bank",
            Role::BankAdmin => "bank_admin",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified identity claims, decoded once at the authentication boundary.
///
/// Downstream guards and handlers consume this typed value from the request
/// extensions; nothing past the extractor touches raw token material.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// User role
    pub role: Role,
    /// Tenant: the bank the caller belongs to
    pub bank_id: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Sign a claim set into a compact token.
///
/// Used by tests and by operators minting service tokens; the gateway itself
/// never issues credentials on the request path.
pub fn sign_claims(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::Malformed(e.to_string()))
}

/// Verify and decode a token against the configured signing secret.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    verify_token_at(token, secret, Utc::now())
}

/// Verification against an explicit evaluation instant.
///
/// The expiry boundary is exclusive of validity: a token whose `exp` equals
/// the evaluation time is already expired. No clock-skew leeway is applied.
pub fn verify_token_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked explicitly below so the boundary stays exclusive.
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            JwtError::DisallowedAlgorithm
        }
        _ => JwtError::Malformed(e.to_string()),
    })?;

    if data.claims.exp <= now.timestamp() {
        return Err(JwtError::Expired);
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_claims(exp_offset_secs: i64) -> Claims {
        let now = Utc::now();
        Claims {
            sub: Uuid::new_v4(),
            role: Role::Bank,
            bank_id: "chase".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(exp_offset_secs)).timestamp(),
        }
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let claims = test_claims(3600);
        let token = sign_claims(&claims, "test-secret").unwrap();

        let verified = verify_token(&token, "test-secret").unwrap();
        assert_eq!(verified.sub, claims.sub);
        assert_eq!(verified.role, Role::Bank);
        assert_eq!(verified.bank_id, "chase");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_claims(&test_claims(3600), "secret-a").unwrap();
        assert_eq!(
            verify_token(&token, "secret-b"),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_disallowed_algorithm_rejected() {
        // Well-formed and correctly signed, but with HS384 instead of HS256.
        let token = encode(
            &Header::new(Algorithm::HS384),
            &test_claims(3600),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(
            verify_token(&token, "test-secret"),
            Err(JwtError::DisallowedAlgorithm)
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign_claims(&test_claims(-60), "test-secret").unwrap();
        assert_eq!(verify_token(&token, "test-secret"), Err(JwtError::Expired));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let claims = test_claims(3600);
        let token = sign_claims(&claims, "test-secret").unwrap();

        let at_expiry = DateTime::from_timestamp(claims.exp, 0).unwrap();
        assert_eq!(
            verify_token_at(&token, "test-secret", at_expiry),
            Err(JwtError::Expired)
        );

        let one_before = DateTime::from_timestamp(claims.exp - 1, 0).unwrap();
        assert!(verify_token_at(&token, "test-secret", one_before).is_ok());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            verify_token("not.a.token", "test-secret"),
            Err(JwtError::Malformed(_)) | Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        // A signed token whose role is outside the fixed set must not decode.
        #[derive(Serialize)]
        struct LooseClaims<'a> {
            sub: Uuid,
            role: &'a str,
            bank_id: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &LooseClaims {
                sub: Uuid::new_v4(),
                role: "superuser",
                bank_id: "chase",
                iat: now,
                exp: now + 3600,
            },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, "test-secret"),
            Err(JwtError::Malformed(_))
        ));
    }
}
