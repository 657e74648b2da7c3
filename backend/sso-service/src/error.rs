use thiserror::Error;
use tonic::{Code, Status};

pub type Result<T> = std::result::Result<T, AuthError>;

/// Service-level error taxonomy
///
/// Storage sentinels are translated into these variants at the service
/// boundary; nothing from the storage vocabulary reaches callers.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user already exists")]
    UserExists,

    #[error("invalid app ID")]
    InvalidAppId,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("operation cancelled")]
    Cancelled,

    /// Reserved for RPCs in the contract that have no handler yet, so they
    /// answer `UNIMPLEMENTED` instead of panicking. Every current RPC is served.
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    /// Wrap an unexpected collaborator failure with the failing operation
    pub fn internal(op: &str, err: impl std::fmt::Display) -> Self {
        AuthError::Internal(format!("{op}: {err}"))
    }

    /// Convert to gRPC Status for wire protocol
    pub fn to_status(&self) -> Status {
        match self {
            // Same code and message whether the user is missing or the password is wrong
            AuthError::InvalidCredentials => {
                Status::new(Code::PermissionDenied, "invalid email or password")
            }
            AuthError::UserExists => Status::new(Code::AlreadyExists, "user already exists"),
            AuthError::InvalidAppId => Status::new(Code::InvalidArgument, "invalid app id"),
            AuthError::DeadlineExceeded => {
                Status::new(Code::DeadlineExceeded, "deadline exceeded")
            }
            AuthError::Cancelled => Status::new(Code::Cancelled, "request cancelled"),
            AuthError::Unimplemented(what) => {
                Status::new(Code::Unimplemented, format!("{what} is not implemented"))
            }
            // Don't leak internal details
            AuthError::Internal(_) => Status::new(Code::Internal, "internal error"),
        }
    }
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        err.to_status()
    }
}
