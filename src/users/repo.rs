use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::users::clock::Clock;
use crate::users::dto::{UserInput, UserPatch};
use crate::users::error::UserError;
use crate::users::password::PasswordHasher;
use crate::users::repo_types::{NewUserRow, User, UserChanges, UserCredentials};
use crate::users::store::UserStore;
use crate::users::validation::validate_minimum_fields;

/// User lifecycle: validation, hashing and timestamping in front of a store.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

fn log_failure(op: &'static str, e: &UserError) {
    match e {
        UserError::Connection(_) | UserError::Query(_) | UserError::Hash(_) => {
            error!(error = %e, op, "user store operation failed")
        }
        _ => debug!(error = %e, op, "user operation rejected"),
    }
}

impl UserRepository {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            clock,
        }
    }

    pub(crate) fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub(crate) fn hasher(&self) -> &dyn PasswordHasher {
        self.hasher.as_ref()
    }

    /// Validates, hashes the password and inserts a new row stamped with
    /// identical created/updated dates.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: UserInput) -> Result<User, UserError> {
        validate_minimum_fields(&input)?;
        let password_hash = self.hasher.hash(&input.password)?;
        let now = self.clock.now();
        let row = NewUserRow {
            created_date: now,
            password_hash,
            email: input.email,
            name: input.name,
            updated_date: now,
        };
        let user = self.store.insert(row).await.inspect_err(|e| {
            log_failure("create", e);
        })?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<User, UserError> {
        self.store
            .find_by_id(id)
            .await
            .inspect_err(|e| log_failure("get_by_id", e))?
            .ok_or(UserError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<User, UserError> {
        self.store
            .find_by_email(email)
            .await
            .inspect_err(|e| log_failure("get_by_email", e))?
            .ok_or(UserError::NotFound)
    }

    /// Replaces password, email and name of an existing user.
    ///
    /// The supplied password is always re-hashed; there is no way to keep the
    /// stored hash through this call. Use [`UserRepository::patch`] for that.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn update(&self, id: i64, input: UserInput) -> Result<User, UserError> {
        validate_minimum_fields(&input)?;
        let changes = UserChanges {
            password_hash: Some(self.hasher.hash(&input.password)?),
            email: Some(input.email),
            name: Some(input.name),
            updated_date: self.clock.now(),
        };
        self.write_changes(id, changes).await
    }

    /// Changes only the fields present in `patch`. `updated_date` is
    /// refreshed even when the patch is empty.
    #[instrument(skip(self, patch))]
    pub async fn patch(&self, id: i64, patch: UserPatch) -> Result<User, UserError> {
        patch.validate()?;
        let password_hash = match patch.password.as_deref() {
            Some(plain) => Some(self.hasher.hash(plain)?),
            None => None,
        };
        let changes = UserChanges {
            password_hash,
            email: patch.email,
            name: patch.name,
            updated_date: self.clock.now(),
        };
        self.write_changes(id, changes).await
    }

    async fn write_changes(&self, id: i64, changes: UserChanges) -> Result<User, UserError> {
        let user = self
            .store
            .update(id, changes)
            .await
            .inspect_err(|e| log_failure("update", e))?
            .ok_or(UserError::NotFound)?;
        info!(user_id = user.id, "user updated");
        Ok(user)
    }

    /// Hard delete. Deleting an id that does not exist is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), UserError> {
        let removed = self
            .store
            .delete(id)
            .await
            .inspect_err(|e| log_failure("delete", e))?;
        if removed == 0 {
            warn!(user_id = id, "delete matched no user");
        } else {
            info!(user_id = id, "user deleted");
        }
        Ok(())
    }

    /// Stored credentials for the login path; `None` for an unknown email.
    pub(crate) async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserError> {
        self.store
            .find_credentials_by_email(email)
            .await
            .inspect_err(|e| log_failure("login", e))
    }

    /// `true` when no stored user has this email.
    #[instrument(skip(self))]
    pub async fn validate_email_is_unique(&self, email: &str) -> Result<bool, UserError> {
        let count = self
            .store
            .count_by_email(email)
            .await
            .inspect_err(|e| log_failure("validate_email_is_unique", e))?;
        Ok(count == 0)
    }
}
