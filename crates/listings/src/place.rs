use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roost_core::{CityId, DomainError, DomainResult, Entity, PlaceId, UserId};

/// A rental listing. `host_id` and `city_id` must reference existing
/// records; the caller checks both against the store before persisting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub host_id: UserId,
    pub city_id: CityId,
    pub price_per_night: i64,
    pub number_of_rooms: i32,
    pub number_of_bathrooms: i32,
    pub max_guests: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a place. Only the name and the two references are
/// required; everything else falls back to an empty or zero default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPlace {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub host_id: UserId,
    pub city_id: CityId,
    pub price_per_night: Option<i64>,
    pub number_of_rooms: Option<i32>,
    pub number_of_bathrooms: Option<i32>,
    pub max_guests: Option<i32>,
}

/// Patch for an existing place. The host never changes after creation;
/// a `city_id` change is re-checked against the store by the caller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdatePlace {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city_id: Option<CityId>,
    pub price_per_night: Option<i64>,
    pub number_of_rooms: Option<i32>,
    pub number_of_bathrooms: Option<i32>,
    pub max_guests: Option<i32>,
}

impl Place {
    pub fn create(input: NewPlace) -> DomainResult<Self> {
        let name = validate_name(&input.name)?;
        let latitude = validate_latitude(input.latitude.unwrap_or(0.0))?;
        let longitude = validate_longitude(input.longitude.unwrap_or(0.0))?;
        let price_per_night = non_negative_i64("price_per_night", input.price_per_night)?;
        let number_of_rooms = non_negative_i32("number_of_rooms", input.number_of_rooms)?;
        let number_of_bathrooms =
            non_negative_i32("number_of_bathrooms", input.number_of_bathrooms)?;
        let max_guests = non_negative_i32("max_guests", input.max_guests)?;

        let now = Utc::now();
        Ok(Self {
            id: PlaceId::new(),
            name,
            description: input.description.unwrap_or_default(),
            address: input.address.unwrap_or_default(),
            latitude,
            longitude,
            host_id: input.host_id,
            city_id: input.city_id,
            price_per_night,
            number_of_rooms,
            number_of_bathrooms,
            max_guests,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: UpdatePlace) -> DomainResult<()> {
        let name = match &patch.name {
            Some(raw) => Some(validate_name(raw)?),
            None => None,
        };
        let latitude = match patch.latitude {
            Some(raw) => Some(validate_latitude(raw)?),
            None => None,
        };
        let longitude = match patch.longitude {
            Some(raw) => Some(validate_longitude(raw)?),
            None => None,
        };
        let price_per_night = match patch.price_per_night {
            Some(raw) => Some(non_negative_i64("price_per_night", Some(raw))?),
            None => None,
        };
        let number_of_rooms = match patch.number_of_rooms {
            Some(raw) => Some(non_negative_i32("number_of_rooms", Some(raw))?),
            None => None,
        };
        let number_of_bathrooms = match patch.number_of_bathrooms {
            Some(raw) => Some(non_negative_i32("number_of_bathrooms", Some(raw))?),
            None => None,
        };
        let max_guests = match patch.max_guests {
            Some(raw) => Some(non_negative_i32("max_guests", Some(raw))?),
            None => None,
        };

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(latitude) = latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = longitude {
            self.longitude = longitude;
        }
        if let Some(city_id) = patch.city_id {
            self.city_id = city_id;
        }
        if let Some(price_per_night) = price_per_night {
            self.price_per_night = price_per_night;
        }
        if let Some(number_of_rooms) = number_of_rooms {
            self.number_of_rooms = number_of_rooms;
        }
        if let Some(number_of_bathrooms) = number_of_bathrooms {
            self.number_of_bathrooms = number_of_bathrooms;
        }
        if let Some(max_guests) = max_guests {
            self.max_guests = max_guests;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Entity for Place {
    type Id = PlaceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate_name(raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation("place name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_latitude(value: f64) -> DomainResult<f64> {
    if !value.is_finite() || !(-90.0..=90.0).contains(&value) {
        return Err(DomainError::validation(format!(
            "latitude {value} out of range [-90, 90]"
        )));
    }
    Ok(value)
}

fn validate_longitude(value: f64) -> DomainResult<f64> {
    if !value.is_finite() || !(-180.0..=180.0).contains(&value) {
        return Err(DomainError::validation(format!(
            "longitude {value} out of range [-180, 180]"
        )));
    }
    Ok(value)
}

fn non_negative_i64(field: &str, value: Option<i64>) -> DomainResult<i64> {
    let value = value.unwrap_or(0);
    if value < 0 {
        return Err(DomainError::validation(format!(
            "{field} cannot be negative"
        )));
    }
    Ok(value)
}

fn non_negative_i32(field: &str, value: Option<i32>) -> DomainResult<i32> {
    let value = value.unwrap_or(0);
    if value < 0 {
        return Err(DomainError::validation(format!(
            "{field} cannot be negative"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_place() -> NewPlace {
        NewPlace {
            name: "Loft overlooking the old port".to_string(),
            description: None,
            address: Some("12 Quai du Port".to_string()),
            latitude: Some(43.2965),
            longitude: Some(5.3698),
            host_id: UserId::new(),
            city_id: CityId::new(),
            price_per_night: Some(120),
            number_of_rooms: Some(2),
            number_of_bathrooms: Some(1),
            max_guests: Some(4),
        }
    }

    #[test]
    fn create_place_success() {
        let place = Place::create(new_place()).unwrap();
        assert_eq!(place.description, "");
        assert_eq!(place.price_per_night, 120);
        assert_eq!(place.created_at, place.updated_at);
    }

    #[test]
    fn optional_fields_default_to_zero() {
        let input = NewPlace {
            description: None,
            address: None,
            latitude: None,
            longitude: None,
            price_per_night: None,
            number_of_rooms: None,
            number_of_bathrooms: None,
            max_guests: None,
            ..new_place()
        };
        let place = Place::create(input).unwrap();
        assert_eq!(place.latitude, 0.0);
        assert_eq!(place.longitude, 0.0);
        assert_eq!(place.price_per_night, 0);
        assert_eq!(place.max_guests, 0);
    }

    #[test]
    fn create_rejects_out_of_range_coordinates() {
        let mut input = new_place();
        input.latitude = Some(91.0);
        assert!(Place::create(input).is_err());

        let mut input = new_place();
        input.longitude = Some(-180.5);
        assert!(Place::create(input).is_err());

        let mut input = new_place();
        input.latitude = Some(f64::NAN);
        assert!(Place::create(input).is_err());
    }

    #[test]
    fn create_rejects_negative_numbers() {
        let mut input = new_place();
        input.price_per_night = Some(-1);
        let err = Place::create(input).unwrap_err();
        assert!(err.to_string().contains("price_per_night"));

        let mut input = new_place();
        input.max_guests = Some(-3);
        assert!(Place::create(input).is_err());
    }

    #[test]
    fn patch_cannot_change_the_host() {
        // UpdatePlace has no host field at all; the closest it gets is city.
        let mut place = Place::create(new_place()).unwrap();
        let host = place.host_id;
        let new_city = CityId::new();

        place
            .apply(UpdatePlace {
                city_id: Some(new_city),
                price_per_night: Some(150),
                ..UpdatePlace::default()
            })
            .unwrap();

        assert_eq!(place.host_id, host);
        assert_eq!(place.city_id, new_city);
        assert_eq!(place.price_per_night, 150);
    }

    #[test]
    fn failed_patch_changes_nothing() {
        let mut place = Place::create(new_place()).unwrap();
        let before = place.clone();

        let err = place
            .apply(UpdatePlace {
                name: Some("Renamed".to_string()),
                latitude: Some(1000.0),
                ..UpdatePlace::default()
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(place, before);
    }

    #[test]
    fn minimal_request_body_deserializes() {
        let body = serde_json::json!({
            "name": "Loft",
            "host_id": UserId::new(),
            "city_id": CityId::new(),
        });
        let input: NewPlace = serde_json::from_value(body).unwrap();
        assert_eq!(input.description, None);
        assert_eq!(input.price_per_night, None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            #[test]
            fn coordinates_in_range_always_pass(
                lat in -90.0_f64..=90.0,
                long in -180.0_f64..=180.0,
            ) {
                prop_assert!(validate_latitude(lat).is_ok());
                prop_assert!(validate_longitude(long).is_ok());
            }

            #[test]
            fn latitude_out_of_range_always_fails(offset in 1e-6_f64..1e6) {
                prop_assert!(validate_latitude(90.0 + offset).is_err());
                prop_assert!(validate_latitude(-90.0 - offset).is_err());
            }

            #[test]
            fn non_negative_prices_always_pass(price in 0_i64..=i64::MAX) {
                prop_assert_eq!(non_negative_i64("price_per_night", Some(price)).unwrap(), price);
            }
        }
    }
}
