use sqlx::FromRow;
use thiserror::Error as ThisError;

/// Model errors
#[derive(Debug, Clone, ThisError)]
pub enum QueryError {
    #[error("Not found")]
    NotFound,
    #[error("A record with id {0} already exists")]
    Duplicate(String),
    #[error("Member {0} is not active")]
    MemberNotActive(String),
    #[error("At least one superAdmin must remain")]
    LastSuperAdmin,
    #[error("Invalid email or password")]
    InvalidCredentials,
}

#[derive(Debug, Clone, FromRow)]
pub struct Id<T> {
    pub id: T,
}
