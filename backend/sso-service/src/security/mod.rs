/// Security module for authentication
///
/// Provides core security primitives for sso-service:
/// - Password hashing and verification (Argon2id)
/// - JWT token issuing (HS256 via crypto-core)
///
/// ## Architecture
///
/// - **crypto-core::jwt**: Shared JWT implementation (HS256, injected secret)
/// - **password**: Argon2id password hashing
pub use crypto_core::jwt::{Claims, JwtError, JwtIssuer};

pub mod password;

pub use password::{PasswordError, PasswordHasher};
