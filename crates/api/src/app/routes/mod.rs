use axum::Router;

pub mod amenities;
pub mod cities;
pub mod countries;
pub mod places;
pub mod reviews;
pub mod session;
pub mod system;
pub mod users;

/// Router for all token-protected endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/countries", countries::router())
        .nest("/cities", cities::router())
        .nest("/amenities", amenities::router())
        .nest("/places", places::router())
        .nest("/reviews", reviews::router())
}
