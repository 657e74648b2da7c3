/// gRPC server module for sso-service
///
/// Exports:
/// - SsoGrpcServer: Auth service implementation
/// - correlation_interceptor: server interceptor assigning correlation IDs
/// - sso: Generated protobuf types from sso.proto
pub mod server;

pub use server::sso;
pub use server::{correlation_interceptor, SsoGrpcServer};
