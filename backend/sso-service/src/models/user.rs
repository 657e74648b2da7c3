use sqlx::FromRow;
use std::fmt;

/// User model - core identity entity
#[derive(Clone, FromRow)]
pub struct User {
    pub id: i64,
    /// Unique, case-sensitive as stored
    pub email: String,
    /// PHC-formatted Argon2 hash, never the plaintext
    pub pass_hash: Vec<u8>,
    pub is_admin: bool,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}
