//! In-memory datastore.
//!
//! Intended for tests/dev. Tables are plain vectors in creation order;
//! lookups are linear scans. Not optimized for performance.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use roost_accounts::User;
use roost_core::{AmenityId, CityId, PlaceId, ReviewId, UserId};
use roost_geo::{City, Country, CountryCode};
use roost_listings::{Amenity, Place, PlaceAmenity};
use roost_reviews::Review;

use crate::datastore::{Datastore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    countries: RwLock<Vec<Country>>,
    users: RwLock<Vec<User>>,
    cities: RwLock<Vec<City>>,
    amenities: RwLock<Vec<Amenity>>,
    places: RwLock<Vec<Place>>,
    reviews: RwLock<Vec<Review>>,
    links: RwLock<Vec<PlaceAmenity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<Vec<T>>) -> Result<RwLockReadGuard<'_, Vec<T>>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<Vec<T>>) -> Result<RwLockWriteGuard<'_, Vec<T>>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
}

#[async_trait::async_trait]
impl Datastore for MemoryStore {
    async fn country_put(&self, country: Country) -> Result<(), StoreError> {
        let mut countries = write(&self.countries)?;
        if !countries.iter().any(|c| c.code == country.code) {
            countries.push(country);
        }
        Ok(())
    }

    async fn country_get(&self, code: &CountryCode) -> Result<Option<Country>, StoreError> {
        Ok(read(&self.countries)?
            .iter()
            .find(|c| &c.code == code)
            .cloned())
    }

    async fn country_all(&self) -> Result<Vec<Country>, StoreError> {
        let mut all = read(&self.countries)?.clone();
        all.sort_by(|a, b| a.code.as_str().cmp(b.code.as_str()));
        Ok(all)
    }

    async fn user_insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = write(&self.users)?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "duplicate email: {}",
                user.email
            )));
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "duplicate username: {}",
                user.username
            )));
        }
        users.push(user);
        Ok(())
    }

    async fn user_get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.iter().find(|u| u.id == id).cloned())
    }

    async fn user_update(&self, user: User) -> Result<(), StoreError> {
        let mut users = write(&self.users)?;
        if users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Conflict(format!(
                "duplicate email: {}",
                user.email
            )));
        }
        if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
            *slot = user;
        }
        Ok(())
    }

    async fn user_delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut users = write(&self.users)?;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn user_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(read(&self.users)?.clone())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn city_insert(&self, city: City) -> Result<(), StoreError> {
        write(&self.cities)?.push(city);
        Ok(())
    }

    async fn city_get(&self, id: CityId) -> Result<Option<City>, StoreError> {
        Ok(read(&self.cities)?.iter().find(|c| c.id == id).cloned())
    }

    async fn city_update(&self, city: City) -> Result<(), StoreError> {
        let mut cities = write(&self.cities)?;
        if let Some(slot) = cities.iter_mut().find(|c| c.id == city.id) {
            *slot = city;
        }
        Ok(())
    }

    async fn city_delete(&self, id: CityId) -> Result<bool, StoreError> {
        let mut cities = write(&self.cities)?;
        let before = cities.len();
        cities.retain(|c| c.id != id);
        Ok(cities.len() < before)
    }

    async fn city_all(&self) -> Result<Vec<City>, StoreError> {
        Ok(read(&self.cities)?.clone())
    }

    async fn cities_in_country(&self, code: &CountryCode) -> Result<Vec<City>, StoreError> {
        Ok(read(&self.cities)?
            .iter()
            .filter(|c| &c.country_code == code)
            .cloned()
            .collect())
    }

    async fn amenity_insert(&self, amenity: Amenity) -> Result<(), StoreError> {
        write(&self.amenities)?.push(amenity);
        Ok(())
    }

    async fn amenity_get(&self, id: AmenityId) -> Result<Option<Amenity>, StoreError> {
        Ok(read(&self.amenities)?.iter().find(|a| a.id == id).cloned())
    }

    async fn amenity_update(&self, amenity: Amenity) -> Result<(), StoreError> {
        let mut amenities = write(&self.amenities)?;
        if let Some(slot) = amenities.iter_mut().find(|a| a.id == amenity.id) {
            *slot = amenity;
        }
        Ok(())
    }

    async fn amenity_delete(&self, id: AmenityId) -> Result<bool, StoreError> {
        let mut amenities = write(&self.amenities)?;
        let before = amenities.len();
        amenities.retain(|a| a.id != id);
        Ok(amenities.len() < before)
    }

    async fn amenity_all(&self) -> Result<Vec<Amenity>, StoreError> {
        Ok(read(&self.amenities)?.clone())
    }

    async fn place_insert(&self, place: Place) -> Result<(), StoreError> {
        write(&self.places)?.push(place);
        Ok(())
    }

    async fn place_get(&self, id: PlaceId) -> Result<Option<Place>, StoreError> {
        Ok(read(&self.places)?.iter().find(|p| p.id == id).cloned())
    }

    async fn place_update(&self, place: Place) -> Result<(), StoreError> {
        let mut places = write(&self.places)?;
        if let Some(slot) = places.iter_mut().find(|p| p.id == place.id) {
            *slot = place;
        }
        Ok(())
    }

    async fn place_delete(&self, id: PlaceId) -> Result<bool, StoreError> {
        let mut places = write(&self.places)?;
        let before = places.len();
        places.retain(|p| p.id != id);
        Ok(places.len() < before)
    }

    async fn place_all(&self) -> Result<Vec<Place>, StoreError> {
        Ok(read(&self.places)?.clone())
    }

    async fn review_insert(&self, review: Review) -> Result<(), StoreError> {
        write(&self.reviews)?.push(review);
        Ok(())
    }

    async fn review_get(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        Ok(read(&self.reviews)?.iter().find(|r| r.id == id).cloned())
    }

    async fn review_update(&self, review: Review) -> Result<(), StoreError> {
        let mut reviews = write(&self.reviews)?;
        if let Some(slot) = reviews.iter_mut().find(|r| r.id == review.id) {
            *slot = review;
        }
        Ok(())
    }

    async fn review_delete(&self, id: ReviewId) -> Result<bool, StoreError> {
        let mut reviews = write(&self.reviews)?;
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        Ok(reviews.len() < before)
    }

    async fn review_all(&self) -> Result<Vec<Review>, StoreError> {
        Ok(read(&self.reviews)?.clone())
    }

    async fn reviews_for_place(&self, place_id: PlaceId) -> Result<Vec<Review>, StoreError> {
        Ok(read(&self.reviews)?
            .iter()
            .filter(|r| r.place_id == place_id)
            .cloned()
            .collect())
    }

    async fn link_insert(&self, link: PlaceAmenity) -> Result<(), StoreError> {
        let mut links = write(&self.links)?;
        if links.iter().any(|l| l.key() == link.key()) {
            return Err(StoreError::Conflict(format!(
                "duplicate association: place {} / amenity {}",
                link.place_id, link.amenity_id
            )));
        }
        links.push(link);
        Ok(())
    }

    async fn link_get(
        &self,
        place_id: PlaceId,
        amenity_id: AmenityId,
    ) -> Result<Option<PlaceAmenity>, StoreError> {
        Ok(read(&self.links)?
            .iter()
            .find(|l| l.key() == (place_id, amenity_id))
            .cloned())
    }

    async fn link_delete(
        &self,
        place_id: PlaceId,
        amenity_id: AmenityId,
    ) -> Result<bool, StoreError> {
        let mut links = write(&self.links)?;
        let before = links.len();
        links.retain(|l| l.key() != (place_id, amenity_id));
        Ok(links.len() < before)
    }

    async fn amenities_for_place(&self, place_id: PlaceId) -> Result<Vec<Amenity>, StoreError> {
        let attached: Vec<AmenityId> = read(&self.links)?
            .iter()
            .filter(|l| l.place_id == place_id)
            .map(|l| l.amenity_id)
            .collect();
        Ok(read(&self.amenities)?
            .iter()
            .filter(|a| attached.contains(&a.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roost_accounts::NewUser;
    use roost_geo::NewCity;
    use roost_listings::{NewAmenity, NewPlace};
    use roost_reviews::NewReview;

    fn user(email: &str, username: &str) -> User {
        User::create(NewUser {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: "pw".to_string(),
            is_admin: None,
        })
        .unwrap()
    }

    fn city(name: &str, country: &str) -> City {
        City::create(NewCity {
            name: name.to_string(),
            country_code: country.parse().unwrap(),
        })
        .unwrap()
    }

    fn place(host: UserId, city: CityId) -> Place {
        Place::create(NewPlace {
            name: "Test place".to_string(),
            description: None,
            address: None,
            latitude: None,
            longitude: None,
            host_id: host,
            city_id: city,
            price_per_night: Some(50),
            number_of_rooms: Some(1),
            number_of_bathrooms: Some(1),
            max_guests: Some(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn country_put_is_idempotent() {
        let store = MemoryStore::new();
        for country in Country::reference_set() {
            store.country_put(country).await.unwrap();
        }
        for country in Country::reference_set() {
            store.country_put(country).await.unwrap();
        }
        assert_eq!(
            store.country_all().await.unwrap().len(),
            Country::reference_set().len()
        );
        let code: CountryCode = "fr".parse().unwrap();
        assert_eq!(
            store.country_get(&code).await.unwrap().unwrap().name,
            "France"
        );
    }

    #[tokio::test]
    async fn duplicate_email_and_username_conflict() {
        let store = MemoryStore::new();
        store.user_insert(user("a@x.io", "alice")).await.unwrap();

        let err = store.user_insert(user("a@x.io", "bob")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = store
            .user_insert(user("b@x.io", "alice"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("alice"));
    }

    #[tokio::test]
    async fn update_cannot_steal_an_email() {
        let store = MemoryStore::new();
        store.user_insert(user("a@x.io", "alice")).await.unwrap();
        let mut bob = user("b@x.io", "bob");
        store.user_insert(bob.clone()).await.unwrap();

        bob.email = "a@x.io".to_string();
        let err = store.user_update(bob).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = MemoryStore::new();
        let u = user("a@x.io", "alice");
        let id = u.id;
        store.user_insert(u).await.unwrap();

        assert!(store.user_delete(id).await.unwrap());
        assert!(!store.user_delete(id).await.unwrap());
        assert!(store.user_get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_keep_creation_order() {
        let store = MemoryStore::new();
        for (email, name) in [("a@x.io", "ana"), ("b@x.io", "ben"), ("c@x.io", "cat")] {
            store.user_insert(user(email, name)).await.unwrap();
        }
        let names: Vec<String> = store
            .user_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["ana", "ben", "cat"]);
    }

    #[tokio::test]
    async fn cities_filter_by_country() {
        let store = MemoryStore::new();
        store.city_insert(city("Lyon", "FR")).await.unwrap();
        store.city_insert(city("Nice", "FR")).await.unwrap();
        store.city_insert(city("Porto", "PT")).await.unwrap();

        let code: CountryCode = "FR".parse().unwrap();
        let cities = store.cities_in_country(&code).await.unwrap();
        assert_eq!(cities.len(), 2);
        assert!(cities.iter().all(|c| c.country_code == code));
    }

    #[tokio::test]
    async fn association_lifecycle() {
        let store = MemoryStore::new();
        let host = user("h@x.io", "host");
        let host_id = host.id;
        store.user_insert(host).await.unwrap();
        let c = city("Lyon", "FR");
        let city_id = c.id;
        store.city_insert(c).await.unwrap();
        let p = place(host_id, city_id);
        let place_id = p.id;
        store.place_insert(p).await.unwrap();

        let wifi = Amenity::create(NewAmenity {
            name: "Wifi".to_string(),
        })
        .unwrap();
        let wifi_id = wifi.id;
        store.amenity_insert(wifi).await.unwrap();

        store
            .link_insert(PlaceAmenity::link(place_id, wifi_id))
            .await
            .unwrap();
        let err = store
            .link_insert(PlaceAmenity::link(place_id, wifi_id))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let attached = store.amenities_for_place(place_id).await.unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].name, "Wifi");

        assert!(store.link_delete(place_id, wifi_id).await.unwrap());
        assert!(!store.link_delete(place_id, wifi_id).await.unwrap());
        assert!(
            store
                .amenities_for_place(place_id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn reviews_filter_by_place() {
        let store = MemoryStore::new();
        let guest = user("g@x.io", "guest");
        let guest_id = guest.id;
        store.user_insert(guest).await.unwrap();
        let host = user("h@x.io", "host");
        let host_id = host.id;
        store.user_insert(host).await.unwrap();
        let c = city("Lyon", "FR");
        let city_id = c.id;
        store.city_insert(c).await.unwrap();

        let first = place(host_id, city_id);
        let second = place(host_id, city_id);
        let first_id = first.id;
        store.place_insert(first).await.unwrap();
        store.place_insert(second.clone()).await.unwrap();

        for (target, comment) in [(first_id, "lovely"), (second.id, "fine"), (first_id, "loud")] {
            store
                .review_insert(
                    Review::create(NewReview {
                        place_id: target,
                        user_id: guest_id,
                        comment: comment.to_string(),
                        rating: 4.0,
                    })
                    .unwrap(),
                )
                .await
                .unwrap();
        }

        let reviews = store.reviews_for_place(first_id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.place_id == first_id));
    }

    #[tokio::test]
    async fn update_replaces_the_stored_record() {
        let store = MemoryStore::new();
        let mut c = city("Lyon", "FR");
        let id = c.id;
        store.city_insert(c.clone()).await.unwrap();

        c.name = "Vieux Lyon".to_string();
        store.city_update(c).await.unwrap();
        assert_eq!(store.city_get(id).await.unwrap().unwrap().name, "Vieux Lyon");
    }
}
