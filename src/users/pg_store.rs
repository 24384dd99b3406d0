use async_trait::async_trait;
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use tracing::error;

use crate::users::error::UserError;
use crate::users::repo_types::{NewUserRow, User, UserChanges, UserCredentials};
use crate::users::store::UserStore;

/// Postgres-backed store. Each call checks out its own pooled connection,
/// which goes back to the pool when the call returns.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn connect(&self) -> Result<PoolConnection<Postgres>, UserError> {
        self.pool.acquire().await.map_err(|e| {
            error!(error = %e, "could not acquire database connection");
            UserError::Connection(e)
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, row: NewUserRow) -> Result<User, UserError> {
        let mut conn = self.connect().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (created_date, currentpassword, email, name, updated_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_date, email, name, updated_date
            "#,
        )
        .bind(row.created_date)
        .bind(&row.password_hash)
        .bind(&row.email)
        .bind(&row.name)
        .bind(row.updated_date)
        .fetch_one(&mut *conn)
        .await
        .map_err(UserError::from_query)?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let mut conn = self.connect().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, created_date, email, name, updated_date
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(UserError::Query)?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let mut conn = self.connect().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, created_date, email, name, updated_date
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(UserError::Query)?;
        Ok(user)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserError> {
        let mut conn = self.connect().await?;
        let creds = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, currentpassword, email, name
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(UserError::Query)?;
        Ok(creds)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>, UserError> {
        let mut conn = self.connect().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET currentpassword = COALESCE($1, currentpassword),
                   email = COALESCE($2, email),
                   name = COALESCE($3, name),
                   updated_date = $4
             WHERE id = $5
            RETURNING id, created_date, email, name, updated_date
            "#,
        )
        .bind(changes.password_hash)
        .bind(changes.email)
        .bind(changes.name)
        .bind(changes.updated_date)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(UserError::from_query)?;
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<u64, UserError> {
        let mut conn = self.connect().await?;
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(UserError::Query)?;
        Ok(done.rows_affected())
    }

    async fn count_by_email(&self, email: &str) -> Result<i64, UserError> {
        let mut conn = self.connect().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&mut *conn)
            .await
            .map_err(UserError::Query)?;
        Ok(count)
    }
}
