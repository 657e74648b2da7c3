/// SSO Service Library
///
/// Authenticates users, issues signed access tokens and answers admin checks.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `context`: Per-request deadline and correlation ID
/// - `error`: Service error taxonomy and gRPC status mapping
/// - `grpc`: gRPC server implementation
/// - `models`: Data models
/// - `security`: Password hashing and JWT issuing
/// - `services`: Business logic (Login, Register, IsAdmin)
/// - `storage`: Credential store contracts and the SQLite store
pub mod config;
pub mod context;
pub mod error;
pub mod grpc;
pub mod models;
pub mod security;
pub mod services;
pub mod storage;

// Re-export commonly used types
pub use error::{AuthError, Result};
pub use grpc::SsoGrpcServer;
pub use services::AuthService;
