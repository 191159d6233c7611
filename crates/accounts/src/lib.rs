//! `roost-accounts` — user accounts domain.
//!
//! Business rules for user records: creation, the update allow-list and
//! credential checks. No IO, no HTTP, no storage.

pub mod user;

pub use user::{NewUser, UpdateUser, User};
