//! Authentication primitives
//!
//! Token verification lives here; the middleware that applies it to requests
//! is in [`crate::middleware::auth`].

mod jwt;

pub use jwt::{sign_claims, verify_token, verify_token_at, Claims, JwtError, Role};
