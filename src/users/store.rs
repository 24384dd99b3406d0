use async_trait::async_trait;

use crate::users::error::UserError;
use crate::users::repo_types::{NewUserRow, User, UserChanges, UserCredentials};

/// Persistence boundary for user rows.
///
/// Every method is a single statement against the store; nothing here spans
/// more than one statement or holds state between calls.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, row: NewUserRow) -> Result<User, UserError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserError>;

    /// Returns the row as written, or `None` when no row has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, UserError>;

    /// Number of rows removed.
    async fn delete(&self, id: i64) -> Result<u64, UserError>;

    async fn count_by_email(&self, email: &str) -> Result<i64, UserError>;
}
