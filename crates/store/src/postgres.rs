//! Postgres-backed datastore.
//!
//! Uniqueness lives in the schema (unique indexes on `users.email` and
//! `users.username`, composite primary key on `place_amenities`), so the
//! database is the final arbiter even when a service-level pre-check races.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation)      | `23505` | `Conflict` | Duplicate email/username/association |
//! | Database (foreign key violation) | `23503` | `Conflict` | Referenced row vanished under a racing write |
//! | Database (other)                 | Any other | `Backend` | Other database errors |
//! | PoolClosed / RowNotFound / other | N/A | `Backend` | Connection failures, unexpected states |

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use roost_accounts::User;
use roost_core::{AmenityId, CityId, PlaceId, ReviewId, UserId};
use roost_geo::{City, Country, CountryCode};
use roost_listings::{Amenity, Place, PlaceAmenity};
use roost_reviews::Review;

use crate::datastore::{Datastore, StoreError};

/// Idempotent DDL applied at startup, in order.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS countries (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL,
        username TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        is_admin BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS users_username_key ON users (username)"#,
    r#"
    CREATE TABLE IF NOT EXISTS cities (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        country_code TEXT NOT NULL REFERENCES countries (code),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS amenities (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS places (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        address TEXT NOT NULL,
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        host_id UUID NOT NULL REFERENCES users (id),
        city_id UUID NOT NULL REFERENCES cities (id),
        price_per_night BIGINT NOT NULL,
        number_of_rooms INTEGER NOT NULL,
        number_of_bathrooms INTEGER NOT NULL,
        max_guests INTEGER NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id UUID PRIMARY KEY,
        place_id UUID NOT NULL REFERENCES places (id),
        user_id UUID NOT NULL REFERENCES users (id),
        comment TEXT NOT NULL,
        rating DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS place_amenities (
        place_id UUID NOT NULL REFERENCES places (id),
        amenity_id UUID NOT NULL REFERENCES amenities (id),
        created_at TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (place_id, amenity_id)
    )
    "#,
];

/// Postgres-backed datastore over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Every statement is `IF NOT EXISTS`, so running this
    /// on every boot is safe.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Datastore for PostgresStore {
    #[instrument(skip(self, country), fields(code = %country.code), err)]
    async fn country_put(&self, country: Country) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO countries (code, name)
            VALUES ($1, $2)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(country.code.as_str())
        .bind(&country.name)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("country_put", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(code = %code), err)]
    async fn country_get(&self, code: &CountryCode) -> Result<Option<Country>, StoreError> {
        let row = sqlx::query(r#"SELECT code, name FROM countries WHERE code = $1"#)
            .bind(code.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("country_get", e))?;
        row.map(country_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn country_all(&self) -> Result<Vec<Country>, StoreError> {
        let rows = sqlx::query(r#"SELECT code, name FROM countries ORDER BY code"#)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("country_all", e))?;
        rows.into_iter().map(country_from_row).collect()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn user_insert(&self, user: User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, username, first_name, last_name, password_hash,
                 is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_insert", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn user_get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "{USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_get", e))?;
        row.map(|r| UserRow::from_row(&r).map(User::from).map_err(bad_row))
            .transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn user_update(&self, user: User) -> Result<(), StoreError> {
        // username is immutable; it is deliberately absent from the SET list.
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, first_name = $3, last_name = $4,
                password_hash = $5, is_admin = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_update", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn user_delete(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("user_delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn user_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(&format!(
            "{USER_COLUMNS} FROM users ORDER BY created_at, id"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_all", e))?;
        rows.iter()
            .map(|r| UserRow::from_row(r).map(User::from).map_err(bad_row))
            .collect()
    }

    #[instrument(skip(self, email), err)]
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "{USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_by_email", e))?;
        row.map(|r| UserRow::from_row(&r).map(User::from).map_err(bad_row))
            .transpose()
    }

    #[instrument(skip(self, username), err)]
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "{USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_by_username", e))?;
        row.map(|r| UserRow::from_row(&r).map(User::from).map_err(bad_row))
            .transpose()
    }

    #[instrument(skip(self, city), fields(city_id = %city.id), err)]
    async fn city_insert(&self, city: City) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cities (id, name, country_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*city.id.as_uuid())
        .bind(&city.name)
        .bind(city.country_code.as_str())
        .bind(city.created_at)
        .bind(city.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("city_insert", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(city_id = %id), err)]
    async fn city_get(&self, id: CityId) -> Result<Option<City>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, name, country_code, created_at, updated_at FROM cities WHERE id = $1"#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("city_get", e))?;
        row.map(|r| city_from_row(&r)).transpose()
    }

    #[instrument(skip(self, city), fields(city_id = %city.id), err)]
    async fn city_update(&self, city: City) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE cities
            SET name = $2, country_code = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(*city.id.as_uuid())
        .bind(&city.name)
        .bind(city.country_code.as_str())
        .bind(city.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("city_update", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(city_id = %id), err)]
    async fn city_delete(&self, id: CityId) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"DELETE FROM cities WHERE id = $1"#)
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("city_delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn city_all(&self) -> Result<Vec<City>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, country_code, created_at, updated_at
            FROM cities ORDER BY created_at, id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("city_all", e))?;
        rows.iter().map(city_from_row).collect()
    }

    #[instrument(skip(self), fields(code = %code), err)]
    async fn cities_in_country(&self, code: &CountryCode) -> Result<Vec<City>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, country_code, created_at, updated_at
            FROM cities WHERE country_code = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(code.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("cities_in_country", e))?;
        rows.iter().map(city_from_row).collect()
    }

    #[instrument(skip(self, amenity), fields(amenity_id = %amenity.id), err)]
    async fn amenity_insert(&self, amenity: Amenity) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO amenities (id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(*amenity.id.as_uuid())
        .bind(&amenity.name)
        .bind(amenity.created_at)
        .bind(amenity.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("amenity_insert", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(amenity_id = %id), err)]
    async fn amenity_get(&self, id: AmenityId) -> Result<Option<Amenity>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, name, created_at, updated_at FROM amenities WHERE id = $1"#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("amenity_get", e))?;
        row.map(|r| AmenityRow::from_row(&r).map(Amenity::from).map_err(bad_row))
            .transpose()
    }

    #[instrument(skip(self, amenity), fields(amenity_id = %amenity.id), err)]
    async fn amenity_update(&self, amenity: Amenity) -> Result<(), StoreError> {
        sqlx::query(r#"UPDATE amenities SET name = $2, updated_at = $3 WHERE id = $1"#)
            .bind(*amenity.id.as_uuid())
            .bind(&amenity.name)
            .bind(amenity.updated_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("amenity_update", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(amenity_id = %id), err)]
    async fn amenity_delete(&self, id: AmenityId) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"DELETE FROM amenities WHERE id = $1"#)
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("amenity_delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn amenity_all(&self) -> Result<Vec<Amenity>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT id, name, created_at, updated_at FROM amenities ORDER BY created_at, id"#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("amenity_all", e))?;
        rows.iter()
            .map(|r| AmenityRow::from_row(r).map(Amenity::from).map_err(bad_row))
            .collect()
    }

    #[instrument(skip(self, place), fields(place_id = %place.id), err)]
    async fn place_insert(&self, place: Place) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO places
                (id, name, description, address, latitude, longitude, host_id,
                 city_id, price_per_night, number_of_rooms, number_of_bathrooms,
                 max_guests, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(*place.id.as_uuid())
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.address)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(*place.host_id.as_uuid())
        .bind(*place.city_id.as_uuid())
        .bind(place.price_per_night)
        .bind(place.number_of_rooms)
        .bind(place.number_of_bathrooms)
        .bind(place.max_guests)
        .bind(place.created_at)
        .bind(place.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("place_insert", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(place_id = %id), err)]
    async fn place_get(&self, id: PlaceId) -> Result<Option<Place>, StoreError> {
        let row = sqlx::query(&format!(
            "{PLACE_COLUMNS} FROM places WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("place_get", e))?;
        row.map(|r| PlaceRow::from_row(&r).map(Place::from).map_err(bad_row))
            .transpose()
    }

    #[instrument(skip(self, place), fields(place_id = %place.id), err)]
    async fn place_update(&self, place: Place) -> Result<(), StoreError> {
        // host_id is immutable; it is deliberately absent from the SET list.
        sqlx::query(
            r#"
            UPDATE places
            SET name = $2, description = $3, address = $4, latitude = $5,
                longitude = $6, city_id = $7, price_per_night = $8,
                number_of_rooms = $9, number_of_bathrooms = $10,
                max_guests = $11, updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(*place.id.as_uuid())
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.address)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(*place.city_id.as_uuid())
        .bind(place.price_per_night)
        .bind(place.number_of_rooms)
        .bind(place.number_of_bathrooms)
        .bind(place.max_guests)
        .bind(place.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("place_update", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(place_id = %id), err)]
    async fn place_delete(&self, id: PlaceId) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"DELETE FROM places WHERE id = $1"#)
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("place_delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn place_all(&self) -> Result<Vec<Place>, StoreError> {
        let rows = sqlx::query(&format!(
            "{PLACE_COLUMNS} FROM places ORDER BY created_at, id"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("place_all", e))?;
        rows.iter()
            .map(|r| PlaceRow::from_row(r).map(Place::from).map_err(bad_row))
            .collect()
    }

    #[instrument(skip(self, review), fields(review_id = %review.id), err)]
    async fn review_insert(&self, review: Review) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reviews
                (id, place_id, user_id, comment, rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*review.id.as_uuid())
        .bind(*review.place_id.as_uuid())
        .bind(*review.user_id.as_uuid())
        .bind(&review.comment)
        .bind(review.rating)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("review_insert", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(review_id = %id), err)]
    async fn review_get(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query(&format!(
            "{REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("review_get", e))?;
        row.map(|r| ReviewRow::from_row(&r).map(Review::from).map_err(bad_row))
            .transpose()
    }

    #[instrument(skip(self, review), fields(review_id = %review.id), err)]
    async fn review_update(&self, review: Review) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE reviews
            SET comment = $2, rating = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(*review.id.as_uuid())
        .bind(&review.comment)
        .bind(review.rating)
        .bind(review.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("review_update", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(review_id = %id), err)]
    async fn review_delete(&self, id: ReviewId) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"DELETE FROM reviews WHERE id = $1"#)
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("review_delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn review_all(&self) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query(&format!(
            "{REVIEW_COLUMNS} FROM reviews ORDER BY created_at, id"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("review_all", e))?;
        rows.iter()
            .map(|r| ReviewRow::from_row(r).map(Review::from).map_err(bad_row))
            .collect()
    }

    #[instrument(skip(self), fields(place_id = %place_id), err)]
    async fn reviews_for_place(&self, place_id: PlaceId) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query(&format!(
            "{REVIEW_COLUMNS} FROM reviews WHERE place_id = $1 ORDER BY created_at, id"
        ))
        .bind(*place_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("reviews_for_place", e))?;
        rows.iter()
            .map(|r| ReviewRow::from_row(r).map(Review::from).map_err(bad_row))
            .collect()
    }

    #[instrument(
        skip(self, link),
        fields(place_id = %link.place_id, amenity_id = %link.amenity_id),
        err
    )]
    async fn link_insert(&self, link: PlaceAmenity) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO place_amenities (place_id, amenity_id, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(*link.place_id.as_uuid())
        .bind(*link.amenity_id.as_uuid())
        .bind(link.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("link_insert", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(place_id = %place_id, amenity_id = %amenity_id), err)]
    async fn link_get(
        &self,
        place_id: PlaceId,
        amenity_id: AmenityId,
    ) -> Result<Option<PlaceAmenity>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT place_id, amenity_id, created_at
            FROM place_amenities
            WHERE place_id = $1 AND amenity_id = $2
            "#,
        )
        .bind(*place_id.as_uuid())
        .bind(*amenity_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("link_get", e))?;
        row.map(|r| {
            LinkRow::from_row(&r)
                .map(PlaceAmenity::from)
                .map_err(bad_row)
        })
        .transpose()
    }

    #[instrument(skip(self), fields(place_id = %place_id, amenity_id = %amenity_id), err)]
    async fn link_delete(
        &self,
        place_id: PlaceId,
        amenity_id: AmenityId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"DELETE FROM place_amenities WHERE place_id = $1 AND amenity_id = $2"#,
        )
        .bind(*place_id.as_uuid())
        .bind(*amenity_id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("link_delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(place_id = %place_id), err)]
    async fn amenities_for_place(&self, place_id: PlaceId) -> Result<Vec<Amenity>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.name, a.created_at, a.updated_at
            FROM amenities a
            JOIN place_amenities pa ON pa.amenity_id = a.id
            WHERE pa.place_id = $1
            ORDER BY pa.created_at
            "#,
        )
        .bind(*place_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("amenities_for_place", e))?;
        rows.iter()
            .map(|r| AmenityRow::from_row(r).map(Amenity::from).map_err(bad_row))
            .collect()
    }
}

const USER_COLUMNS: &str = "SELECT id, email, username, first_name, last_name, \
     password_hash, is_admin, created_at, updated_at";

const PLACE_COLUMNS: &str = "SELECT id, name, description, address, latitude, longitude, \
     host_id, city_id, price_per_night, number_of_rooms, number_of_bathrooms, \
     max_guests, created_at, updated_at";

const REVIEW_COLUMNS: &str =
    "SELECT id, place_id, user_id, comment, rating, created_at, updated_at";

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    // Unique violation
                    "23505" => StoreError::Conflict(msg),
                    // Foreign key violation: a referenced row vanished
                    // between the service pre-check and this write.
                    "23503" => StoreError::Conflict(msg),
                    _ => StoreError::Backend(msg),
                }
            } else {
                StoreError::Backend(msg)
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::RowNotFound => {
            // Should not happen: reads use fetch_optional/fetch_all.
            StoreError::Backend(format!("unexpected row not found in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

fn bad_row(err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to deserialize row: {err}"))
}

fn country_from_row(row: sqlx::postgres::PgRow) -> Result<Country, StoreError> {
    let code: String = row.try_get("code").map_err(bad_row)?;
    let name: String = row.try_get("name").map_err(bad_row)?;
    Ok(Country {
        code: parse_code(code)?,
        name,
    })
}

fn city_from_row(row: &sqlx::postgres::PgRow) -> Result<City, StoreError> {
    let row = CityRow::from_row(row).map_err(bad_row)?;
    Ok(City {
        id: CityId::from_uuid(row.id),
        name: row.name,
        country_code: parse_code(row.country_code)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn parse_code(raw: String) -> Result<CountryCode, StoreError> {
    CountryCode::try_from(raw).map_err(|e| StoreError::Backend(format!("bad stored code: {e}")))
}

struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            password_hash: row.try_get("password_hash")?,
            is_admin: row.try_get("is_admin")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

struct CityRow {
    id: Uuid,
    name: String,
    country_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for CityRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CityRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            country_code: row.try_get("country_code")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

struct AmenityRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for AmenityRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(AmenityRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<AmenityRow> for Amenity {
    fn from(row: AmenityRow) -> Self {
        Amenity {
            id: AmenityId::from_uuid(row.id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

struct PlaceRow {
    id: Uuid,
    name: String,
    description: String,
    address: String,
    latitude: f64,
    longitude: f64,
    host_id: Uuid,
    city_id: Uuid,
    price_per_night: i64,
    number_of_rooms: i32,
    number_of_bathrooms: i32,
    max_guests: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for PlaceRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(PlaceRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            address: row.try_get("address")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            host_id: row.try_get("host_id")?,
            city_id: row.try_get("city_id")?,
            price_per_night: row.try_get("price_per_night")?,
            number_of_rooms: row.try_get("number_of_rooms")?,
            number_of_bathrooms: row.try_get("number_of_bathrooms")?,
            max_guests: row.try_get("max_guests")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Place {
            id: PlaceId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            host_id: UserId::from_uuid(row.host_id),
            city_id: CityId::from_uuid(row.city_id),
            price_per_night: row.price_per_night,
            number_of_rooms: row.number_of_rooms,
            number_of_bathrooms: row.number_of_bathrooms,
            max_guests: row.max_guests,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

struct ReviewRow {
    id: Uuid,
    place_id: Uuid,
    user_id: Uuid,
    comment: String,
    rating: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for ReviewRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ReviewRow {
            id: row.try_get("id")?,
            place_id: row.try_get("place_id")?,
            user_id: row.try_get("user_id")?,
            comment: row.try_get("comment")?,
            rating: row.try_get("rating")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: ReviewId::from_uuid(row.id),
            place_id: PlaceId::from_uuid(row.place_id),
            user_id: UserId::from_uuid(row.user_id),
            comment: row.comment,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

struct LinkRow {
    place_id: Uuid,
    amenity_id: Uuid,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for LinkRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(LinkRow {
            place_id: row.try_get("place_id")?,
            amenity_id: row.try_get("amenity_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<LinkRow> for PlaceAmenity {
    fn from(row: LinkRow) -> Self {
        PlaceAmenity {
            place_id: PlaceId::from_uuid(row.place_id),
            amenity_id: AmenityId::from_uuid(row.amenity_id),
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_covers_every_table() {
        let ddl = SCHEMA.join("\n");
        for table in [
            "countries",
            "users",
            "cities",
            "amenities",
            "places",
            "reviews",
            "place_amenities",
        ] {
            assert!(
                ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "missing table {table}"
            );
        }
        assert!(ddl.contains("users_email_key"));
        assert!(ddl.contains("PRIMARY KEY (place_id, amenity_id)"));
    }

    #[test]
    fn rows_convert_into_domain_records() {
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::now_v7(),
            email: "a@x.io".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_admin: true,
            created_at: now,
            updated_at: now,
        };
        let user = User::from(row);
        assert_eq!(user.username, "alice");
        assert!(user.is_admin);
    }
}
