//! `roost-store` — persistence layer.
//!
//! One [`Datastore`] trait, two backends: [`MemoryStore`] for tests and
//! development, [`PostgresStore`] for production. Both enforce the same
//! uniqueness rules so the HTTP layer behaves identically on either.

pub mod datastore;
pub mod memory;
pub mod postgres;

pub use datastore::{Datastore, StoreError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
