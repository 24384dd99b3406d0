use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,                       // assigned by the store
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,  // set once on insert
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_date: OffsetDateTime,  // refreshed on every update
}

/// Stored credentials, used only by the login path.
#[derive(Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    #[sqlx(rename = "currentpassword")]
    pub password_hash: String,
    pub email: String,
    pub name: String,
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Row handed to the store on insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub created_date: OffsetDateTime,
    pub password_hash: String,
    pub email: String,
    pub name: String,
    pub updated_date: OffsetDateTime,
}

/// Column changes for one update statement. `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub updated_date: OffsetDateTime,
}
