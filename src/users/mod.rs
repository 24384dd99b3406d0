use crate::state::AppState;
use axum::Router;

pub mod auth;
mod clock;
pub mod dto;
mod error;
pub mod handlers;
mod memory_store;
mod password;
mod pg_store;
pub mod repo;
mod repo_types;
mod store;
mod validation;

pub use auth::{AuthenticatedUser, Authenticator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dto::{LoginRequest, UserInput, UserPatch};
pub use error::UserError;
pub use memory_store::MemoryUserStore;
pub use password::{Argon2Hasher, PasswordHasher};
pub use pg_store::PgUserStore;
pub use repo::UserRepository;
pub use repo_types::{NewUserRow, User, UserChanges, UserCredentials};
pub use store::UserStore;
pub use validation::{validate_minimum_fields, RequiredField, ValidationError};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::user_routes())
        .merge(handlers::auth_routes())
}
