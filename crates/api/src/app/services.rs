//! Application services: orchestration between HTTP handlers and the store.
//!
//! Each method runs the checks the store cannot express well (foreign-key
//! existence with a descriptive message, uniqueness pre-checks) and then
//! performs the store call. The store's own constraints stay in place as a
//! conflict backstop, so a race never corrupts data, it only changes which
//! error message the loser sees.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use roost_accounts::{NewUser, UpdateUser, User};
use roost_auth::{AccessClaims, TokenCodec, TokenError};
use roost_core::{AmenityId, CityId, DomainError, PlaceId, ReviewId, UserId};
use roost_geo::{City, Country, CountryCode, NewCity, UpdateCity};
use roost_listings::{
    Amenity, NewAmenity, NewPlace, Place, PlaceAmenity, UpdateAmenity, UpdatePlace,
};
use roost_reviews::{NewReview, Review, UpdateReview};
use roost_store::{Datastore, StoreError};

/// Failure of a service operation. Domain errors carry the HTTP-visible
/// status; store errors are conflicts or opaque backend failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of a login attempt. Unknown username and wrong password are
/// deliberately indistinguishable to the caller.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Wrong username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub struct AppServices {
    store: Arc<dyn Datastore>,
    tokens: Arc<dyn TokenCodec>,
}

impl AppServices {
    pub fn new(store: Arc<dyn Datastore>, tokens: Arc<dyn TokenCodec>) -> Self {
        Self { store, tokens }
    }

    /// Put the built-in country set into the store. `country_put` leaves
    /// existing entries untouched, so calling this on every boot is fine.
    pub async fn seed_countries(&self) -> Result<(), StoreError> {
        for country in Country::reference_set() {
            self.store.country_put(country).await?;
        }
        Ok(())
    }

    // ---- session ----

    pub async fn login(&self, username: &str, password: &str) -> Result<String, LoginError> {
        let user = self
            .store
            .user_by_username(username)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        if !user.check_password(password) {
            return Err(LoginError::InvalidCredentials);
        }

        let claims = AccessClaims::new(user.id, user.username.as_str(), user.is_admin, Utc::now());
        Ok(self.tokens.issue(&claims)?)
    }

    // ---- users ----

    pub async fn create_user(&self, input: NewUser) -> Result<User, ServiceError> {
        let user = User::create(input)?;
        if self.store.user_by_email(&user.email).await?.is_some() {
            return Err(DomainError::conflict(format!("duplicate email: {}", user.email)).into());
        }
        if self.store.user_by_username(&user.username).await?.is_some() {
            return Err(
                DomainError::conflict(format!("duplicate username: {}", user.username)).into(),
            );
        }
        self.store.user_insert(user.clone()).await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ServiceError> {
        self.store
            .user_get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user with id {id} not found")).into())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.user_all().await?)
    }

    pub async fn update_user(&self, id: UserId, patch: UpdateUser) -> Result<User, ServiceError> {
        let mut user = self.get_user(id).await?;

        // Pre-check an email change against other accounts so the caller
        // gets a conflict naming the address instead of a raw store error.
        if let Some(raw) = &patch.email {
            let email = raw.trim().to_lowercase();
            if let Some(holder) = self.store.user_by_email(&email).await? {
                if holder.id != id {
                    return Err(DomainError::conflict(format!("duplicate email: {email}")).into());
                }
            }
        }

        user.apply(patch)?;
        self.store.user_update(user.clone()).await?;
        Ok(user)
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), ServiceError> {
        if !self.store.user_delete(id).await? {
            return Err(DomainError::not_found(format!("user with id {id} not found")).into());
        }
        Ok(())
    }

    // ---- countries ----

    pub async fn list_countries(&self) -> Result<Vec<Country>, ServiceError> {
        Ok(self.store.country_all().await?)
    }

    pub async fn get_country(&self, code: &CountryCode) -> Result<Country, ServiceError> {
        self.store.country_get(code).await?.ok_or_else(|| {
            DomainError::not_found(format!("country with code {code} not found")).into()
        })
    }

    pub async fn cities_in_country(&self, code: &CountryCode) -> Result<Vec<City>, ServiceError> {
        self.get_country(code).await?;
        Ok(self.store.cities_in_country(code).await?)
    }

    // ---- cities ----

    pub async fn create_city(&self, input: NewCity) -> Result<City, ServiceError> {
        self.require_country(&input.country_code).await?;
        let city = City::create(input)?;
        self.store.city_insert(city.clone()).await?;
        Ok(city)
    }

    pub async fn get_city(&self, id: CityId) -> Result<City, ServiceError> {
        self.store
            .city_get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("city with id {id} not found")).into())
    }

    pub async fn list_cities(&self) -> Result<Vec<City>, ServiceError> {
        Ok(self.store.city_all().await?)
    }

    pub async fn update_city(&self, id: CityId, patch: UpdateCity) -> Result<City, ServiceError> {
        let mut city = self.get_city(id).await?;
        if let Some(code) = &patch.country_code {
            self.require_country(code).await?;
        }
        city.apply(patch)?;
        self.store.city_update(city.clone()).await?;
        Ok(city)
    }

    pub async fn delete_city(&self, id: CityId) -> Result<(), ServiceError> {
        if !self.store.city_delete(id).await? {
            return Err(DomainError::not_found(format!("city with id {id} not found")).into());
        }
        Ok(())
    }

    // ---- amenities ----

    pub async fn create_amenity(&self, input: NewAmenity) -> Result<Amenity, ServiceError> {
        let amenity = Amenity::create(input)?;
        self.store.amenity_insert(amenity.clone()).await?;
        Ok(amenity)
    }

    pub async fn get_amenity(&self, id: AmenityId) -> Result<Amenity, ServiceError> {
        self.store
            .amenity_get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("amenity with id {id} not found")).into())
    }

    pub async fn list_amenities(&self) -> Result<Vec<Amenity>, ServiceError> {
        Ok(self.store.amenity_all().await?)
    }

    pub async fn update_amenity(
        &self,
        id: AmenityId,
        patch: UpdateAmenity,
    ) -> Result<Amenity, ServiceError> {
        let mut amenity = self.get_amenity(id).await?;
        amenity.apply(patch)?;
        self.store.amenity_update(amenity.clone()).await?;
        Ok(amenity)
    }

    pub async fn delete_amenity(&self, id: AmenityId) -> Result<(), ServiceError> {
        if !self.store.amenity_delete(id).await? {
            return Err(DomainError::not_found(format!("amenity with id {id} not found")).into());
        }
        Ok(())
    }

    // ---- places ----

    pub async fn create_place(&self, input: NewPlace) -> Result<Place, ServiceError> {
        self.require_user(input.host_id).await?;
        self.require_city(input.city_id).await?;
        let place = Place::create(input)?;
        self.store.place_insert(place.clone()).await?;
        Ok(place)
    }

    pub async fn get_place(&self, id: PlaceId) -> Result<Place, ServiceError> {
        self.store
            .place_get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("place with id {id} not found")).into())
    }

    pub async fn list_places(&self) -> Result<Vec<Place>, ServiceError> {
        Ok(self.store.place_all().await?)
    }

    pub async fn update_place(
        &self,
        id: PlaceId,
        patch: UpdatePlace,
    ) -> Result<Place, ServiceError> {
        let mut place = self.get_place(id).await?;
        if let Some(city_id) = patch.city_id {
            self.require_city(city_id).await?;
        }
        place.apply(patch)?;
        self.store.place_update(place.clone()).await?;
        Ok(place)
    }

    pub async fn delete_place(&self, id: PlaceId) -> Result<(), ServiceError> {
        if !self.store.place_delete(id).await? {
            return Err(DomainError::not_found(format!("place with id {id} not found")).into());
        }
        Ok(())
    }

    pub async fn reviews_for_place(&self, place_id: PlaceId) -> Result<Vec<Review>, ServiceError> {
        self.get_place(place_id).await?;
        Ok(self.store.reviews_for_place(place_id).await?)
    }

    pub async fn amenities_for_place(
        &self,
        place_id: PlaceId,
    ) -> Result<Vec<Amenity>, ServiceError> {
        self.get_place(place_id).await?;
        Ok(self.store.amenities_for_place(place_id).await?)
    }

    pub async fn attach_amenity(
        &self,
        place_id: PlaceId,
        amenity_id: AmenityId,
    ) -> Result<PlaceAmenity, ServiceError> {
        self.get_place(place_id).await?;
        self.get_amenity(amenity_id).await?;

        if self.store.link_get(place_id, amenity_id).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "duplicate association: place {place_id} / amenity {amenity_id}"
            ))
            .into());
        }

        let link = PlaceAmenity::link(place_id, amenity_id);
        self.store.link_insert(link.clone()).await?;
        Ok(link)
    }

    pub async fn detach_amenity(
        &self,
        place_id: PlaceId,
        amenity_id: AmenityId,
    ) -> Result<(), ServiceError> {
        self.get_place(place_id).await?;
        self.get_amenity(amenity_id).await?;

        if !self.store.link_delete(place_id, amenity_id).await? {
            return Err(DomainError::not_found(format!(
                "place {place_id} has no amenity {amenity_id}"
            ))
            .into());
        }
        Ok(())
    }

    // ---- reviews ----

    pub async fn create_review(&self, input: NewReview) -> Result<Review, ServiceError> {
        self.require_place(input.place_id).await?;
        self.require_user(input.user_id).await?;
        let review = Review::create(input)?;
        self.store.review_insert(review.clone()).await?;
        Ok(review)
    }

    pub async fn get_review(&self, id: ReviewId) -> Result<Review, ServiceError> {
        self.store
            .review_get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("review with id {id} not found")).into())
    }

    pub async fn list_reviews(&self) -> Result<Vec<Review>, ServiceError> {
        Ok(self.store.review_all().await?)
    }

    pub async fn update_review(
        &self,
        id: ReviewId,
        patch: UpdateReview,
    ) -> Result<Review, ServiceError> {
        let mut review = self.get_review(id).await?;
        review.apply(patch)?;
        self.store.review_update(review.clone()).await?;
        Ok(review)
    }

    pub async fn delete_review(&self, id: ReviewId) -> Result<(), ServiceError> {
        if !self.store.review_delete(id).await? {
            return Err(DomainError::not_found(format!("review with id {id} not found")).into());
        }
        Ok(())
    }

    // ---- foreign-key pre-checks ----
    //
    // These cover ids supplied in a request body. A missing referent is the
    // client's mistake, so it surfaces as a validation error (400) naming
    // the id, not as a 404 for the resource being created.

    async fn require_country(&self, code: &CountryCode) -> Result<(), ServiceError> {
        if self.store.country_get(code).await?.is_none() {
            return Err(
                DomainError::validation(format!("country with code {code} not found")).into(),
            );
        }
        Ok(())
    }

    async fn require_user(&self, id: UserId) -> Result<(), ServiceError> {
        if self.store.user_get(id).await?.is_none() {
            return Err(DomainError::validation(format!("user with id {id} not found")).into());
        }
        Ok(())
    }

    async fn require_city(&self, id: CityId) -> Result<(), ServiceError> {
        if self.store.city_get(id).await?.is_none() {
            return Err(DomainError::validation(format!("city with id {id} not found")).into());
        }
        Ok(())
    }

    async fn require_place(&self, id: PlaceId) -> Result<(), ServiceError> {
        if self.store.place_get(id).await?.is_none() {
            return Err(DomainError::validation(format!("place with id {id} not found")).into());
        }
        Ok(())
    }
}
