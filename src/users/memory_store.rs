use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::users::error::UserError;
use crate::users::repo_types::{NewUserRow, User, UserChanges, UserCredentials};
use crate::users::store::UserStore;

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, StoredUser>,
}

impl Inner {
    fn email_in_use(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|r| r.user.email == email && Some(r.user.id) != except)
    }
}

/// In-process store with the same rules as the `users` table:
/// ids are assigned in order and emails are unique.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, row: NewUserRow) -> Result<User, UserError> {
        let mut inner = self.inner.write().await;
        if inner.email_in_use(&row.email, None) {
            return Err(UserError::EmailTaken);
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            created_date: row.created_date,
            email: row.email,
            name: row.name,
            updated_date: row.updated_date,
        };
        inner.rows.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: row.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.get(&id).map(|r| r.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .find(|r| r.user.email == email)
            .map(|r| r.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .find(|r| r.user.email == email)
            .map(|r| UserCredentials {
                id: r.user.id,
                password_hash: r.password_hash.clone(),
                email: r.user.email.clone(),
                name: r.user.name.clone(),
            }))
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, UserError> {
        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if inner.email_in_use(email, Some(id)) {
                return Err(UserError::EmailTaken);
            }
        }
        let Some(stored) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(hash) = changes.password_hash {
            stored.password_hash = hash;
        }
        if let Some(email) = changes.email {
            stored.user.email = email;
        }
        if let Some(name) = changes.name {
            stored.user.name = name;
        }
        stored.user.updated_date = changes.updated_date;
        Ok(Some(stored.user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<u64, UserError> {
        let mut inner = self.inner.write().await;
        Ok(u64::from(inner.rows.remove(&id).is_some()))
    }

    async fn count_by_email(&self, email: &str) -> Result<i64, UserError> {
        let inner = self.inner.read().await;
        let count = inner.rows.values().filter(|r| r.user.email == email).count();
        Ok(count as i64)
    }
}
