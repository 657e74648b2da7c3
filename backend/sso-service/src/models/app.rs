use sqlx::FromRow;
use std::fmt;

/// Registered client application (tenant)
#[derive(Clone, FromRow)]
pub struct App {
    pub id: i32,
    pub name: String,
    /// Per-application signing secret
    pub secret: String,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
