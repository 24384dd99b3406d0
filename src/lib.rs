//! User-account management: lifecycle of user records, password hashing
//! and credential checks over a Postgres `users` table.

pub mod app;
pub mod config;
pub mod state;
pub mod users;
