use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::users::dto::LoginRequest;
use crate::users::error::UserError;
use crate::users::repo::UserRepository;
use crate::users::repo_types::UserCredentials;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// The stored record of a user who just logged in, minus the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<UserCredentials> for AuthenticatedUser {
    fn from(c: UserCredentials) -> Self {
        Self {
            id: c.id,
            email: c.email,
            name: c.name,
        }
    }
}

/// Checks submitted credentials against the stored hash.
#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    // Verified against when the email is unknown, so both failure paths
    // pay for one hash.
    decoy_hash: Arc<str>,
}

impl Authenticator {
    pub fn new(users: UserRepository) -> Result<Self, UserError> {
        let decoy_hash = users.hasher().hash(DECOY_PASSWORD)?.into();
        Ok(Self { users, decoy_hash })
    }

    /// Unknown email and wrong password both come back as
    /// [`UserError::InvalidCredentials`].
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthenticatedUser, UserError> {
        let creds = match self.users.credentials_by_email(&request.email).await? {
            Some(c) => c,
            None => {
                self.users.hasher().verify(&self.decoy_hash, &request.password);
                warn!("login unknown email");
                return Err(UserError::InvalidCredentials);
            }
        };

        if !self.users.hasher().verify(&creds.password_hash, &request.password) {
            warn!(user_id = creds.id, "login invalid password");
            return Err(UserError::InvalidCredentials);
        }

        info!(user_id = creds.id, "user logged in");
        Ok(creds.into())
    }
}
