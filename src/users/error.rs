use thiserror::Error;

use crate::users::validation::ValidationError;

/// Failure of a user operation.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database connection unavailable: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("database query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("user not found")]
    NotFound,

    #[error("email already registered")]
    EmailTaken,

    /// Unknown email and wrong password both end up here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(#[source] argon2::password_hash::Error),
}

impl UserError {
    /// Classifies a statement error, picking out unique-constraint violations.
    pub(crate) fn from_query(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return UserError::EmailTaken;
            }
        }
        UserError::Query(e)
    }
}
