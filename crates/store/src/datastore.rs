use thiserror::Error;

use roost_accounts::User;
use roost_core::{AmenityId, CityId, PlaceId, ReviewId, UserId};
use roost_geo::{City, Country, CountryCode};
use roost_listings::{Amenity, Place, PlaceAmenity};
use roost_reviews::Review;

/// Storage operation error.
///
/// These are **infrastructure errors** as opposed to domain errors
/// (validation, missing records). A `Conflict` is the one storage outcome
/// the HTTP layer reports to clients; everything else is a 500.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (duplicate email,
    /// duplicate username, duplicate association key).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed: connection loss, poisoned lock, bad row.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Uniform persistence interface for every record collection.
///
/// ## Contract
///
/// - `*_insert` rejects duplicates of unique fields with [`StoreError::Conflict`].
/// - `*_get` returns `Ok(None)` for an unknown id, never an error.
/// - `*_update` replaces the stored record matching the record's id; updating
///   a vanished id is a no-op (callers fetch before they patch).
/// - `*_delete` reports whether a record existed, deleting nothing otherwise.
/// - `*_all` lists in creation order.
///
/// Countries are keyed by their two-letter code and have no update or
/// delete: they are seeded reference data. `country_put` inserts the entry
/// if absent and leaves an existing one untouched, so seeding is idempotent,
/// and `country_all` sorts by code rather than insertion order.
#[async_trait::async_trait]
pub trait Datastore: Send + Sync {
    // countries
    async fn country_put(&self, country: Country) -> Result<(), StoreError>;
    async fn country_get(&self, code: &CountryCode) -> Result<Option<Country>, StoreError>;
    async fn country_all(&self) -> Result<Vec<Country>, StoreError>;

    // users
    async fn user_insert(&self, user: User) -> Result<(), StoreError>;
    async fn user_get(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn user_update(&self, user: User) -> Result<(), StoreError>;
    async fn user_delete(&self, id: UserId) -> Result<bool, StoreError>;
    async fn user_all(&self) -> Result<Vec<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    // cities
    async fn city_insert(&self, city: City) -> Result<(), StoreError>;
    async fn city_get(&self, id: CityId) -> Result<Option<City>, StoreError>;
    async fn city_update(&self, city: City) -> Result<(), StoreError>;
    async fn city_delete(&self, id: CityId) -> Result<bool, StoreError>;
    async fn city_all(&self) -> Result<Vec<City>, StoreError>;
    async fn cities_in_country(&self, code: &CountryCode) -> Result<Vec<City>, StoreError>;

    // amenities
    async fn amenity_insert(&self, amenity: Amenity) -> Result<(), StoreError>;
    async fn amenity_get(&self, id: AmenityId) -> Result<Option<Amenity>, StoreError>;
    async fn amenity_update(&self, amenity: Amenity) -> Result<(), StoreError>;
    async fn amenity_delete(&self, id: AmenityId) -> Result<bool, StoreError>;
    async fn amenity_all(&self) -> Result<Vec<Amenity>, StoreError>;

    // places
    async fn place_insert(&self, place: Place) -> Result<(), StoreError>;
    async fn place_get(&self, id: PlaceId) -> Result<Option<Place>, StoreError>;
    async fn place_update(&self, place: Place) -> Result<(), StoreError>;
    async fn place_delete(&self, id: PlaceId) -> Result<bool, StoreError>;
    async fn place_all(&self) -> Result<Vec<Place>, StoreError>;

    // reviews
    async fn review_insert(&self, review: Review) -> Result<(), StoreError>;
    async fn review_get(&self, id: ReviewId) -> Result<Option<Review>, StoreError>;
    async fn review_update(&self, review: Review) -> Result<(), StoreError>;
    async fn review_delete(&self, id: ReviewId) -> Result<bool, StoreError>;
    async fn review_all(&self) -> Result<Vec<Review>, StoreError>;
    async fn reviews_for_place(&self, place_id: PlaceId) -> Result<Vec<Review>, StoreError>;

    // place-amenity associations (composite key)
    async fn link_insert(&self, link: PlaceAmenity) -> Result<(), StoreError>;
    async fn link_get(
        &self,
        place_id: PlaceId,
        amenity_id: AmenityId,
    ) -> Result<Option<PlaceAmenity>, StoreError>;
    async fn link_delete(
        &self,
        place_id: PlaceId,
        amenity_id: AmenityId,
    ) -> Result<bool, StoreError>;
    async fn amenities_for_place(&self, place_id: PlaceId) -> Result<Vec<Amenity>, StoreError>;
}
