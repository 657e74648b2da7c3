//! Cryptographic primitives shared by the SSO backend.
//!
//! - `jwt`: HS256 access token issuing and validation

pub mod jwt;

pub use jwt::{Claims, JwtError, JwtIssuer};
