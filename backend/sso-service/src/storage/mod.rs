//! Credential store contracts consumed by the auth service
//!
//! The service depends on three narrow capabilities. One concrete store may
//! implement all of them (see [`sqlite::Storage`]), or each may come from a
//! different backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{App, User};

pub mod sqlite;

pub use sqlite::Storage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("app not found")]
    AppNotFound,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::Database(format!("migration failed: {err}"))
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Persist a new user and return the assigned ID.
    ///
    /// Returns `StorageError::UserExists` if the email is already registered.
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> StorageResult<i64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Look up a user by exact email. `StorageError::UserNotFound` if absent.
    async fn user(&self, email: &str) -> StorageResult<User>;

    /// Whether the user holds the admin flag. `StorageError::UserNotFound` if absent.
    async fn is_admin(&self, user_id: i64) -> StorageResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppProvider: Send + Sync {
    /// Look up an application by ID. `StorageError::AppNotFound` if absent.
    async fn app(&self, app_id: i32) -> StorageResult<App>;
}
