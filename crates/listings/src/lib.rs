//! `roost-listings` — places, amenities and their association.
//!
//! Business rules for rental listings: the place record with its host and
//! city references, the amenity catalogue, and the composite-key link
//! between the two. No IO, no HTTP, no storage.

pub mod amenity;
pub mod association;
pub mod place;

pub use amenity::{Amenity, NewAmenity, UpdateAmenity};
pub use association::PlaceAmenity;
pub use place::{NewPlace, Place, UpdatePlace};
