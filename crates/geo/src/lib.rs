//! `roost-geo` — countries and cities.
//!
//! Countries are natural-key reference data (no uuid, no timestamps,
//! read-only through the API); cities are ordinary records keyed into a
//! country. No IO, no HTTP, no storage.

pub mod city;
pub mod country;

pub use city::{City, NewCity, UpdateCity};
pub use country::{Country, CountryCode};
