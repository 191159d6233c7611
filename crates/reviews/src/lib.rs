//! `roost-reviews` — guest reviews of places.
//!
//! No IO, no HTTP, no storage.

pub mod review;

pub use review::{NewReview, Review, UpdateReview};
