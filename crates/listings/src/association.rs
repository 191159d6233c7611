use chrono::{DateTime, Utc};
use serde::Serialize;

use roost_core::{AmenityId, PlaceId};

/// Link between a place and an amenity.
///
/// Identity is the composite `(place_id, amenity_id)` pair: no surrogate id,
/// and no updates — links are only created and deleted. Both referenced
/// records must exist when the link is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceAmenity {
    pub place_id: PlaceId,
    pub amenity_id: AmenityId,
    pub created_at: DateTime<Utc>,
}

impl PlaceAmenity {
    pub fn link(place_id: PlaceId, amenity_id: AmenityId) -> Self {
        Self {
            place_id,
            amenity_id,
            created_at: Utc::now(),
        }
    }

    /// The composite key.
    pub fn key(&self) -> (PlaceId, AmenityId) {
        (self.place_id, self.amenity_id)
    }
}
