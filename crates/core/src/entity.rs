//! Entity trait: identity + continuity across state changes.

use chrono::{DateTime, Utc};

/// Entity marker + minimal interface.
///
/// Every stored record carries a server-assigned identifier and a pair of
/// UTC timestamps. Both timestamps are maintained by the application;
/// clients can never supply or overwrite them.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// When the record was created.
    fn created_at(&self) -> DateTime<Utc>;

    /// When the record last changed. Equals `created_at` until the first
    /// successful update.
    fn updated_at(&self) -> DateTime<Utc>;
}
