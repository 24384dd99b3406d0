use std::fmt;

use serde::{Deserialize, Serialize};

/// Request body for creating a user or replacing all of its fields.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    /// Plaintext; hashed before it reaches the store.
    #[serde(default, rename = "currentPassword")]
    pub password: String,
}

impl fmt::Debug for UserInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInput")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Request body for a partial update. Absent fields stay as stored.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "currentPassword")]
    pub password: Option<String>,
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Request body for login.
#[derive(Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "currentPassword")]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Query string carrying an email, for lookups and availability checks.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Response for the email availability check.
#[derive(Debug, Serialize)]
pub struct EmailAvailability {
    pub email: String,
    pub available: bool,
}
