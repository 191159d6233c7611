//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: orchestration over the store (FK checks, uniqueness, login)
//! - `routes/`: HTTP routes + handlers (one file per collection)
//! - `dto.rs`: request payloads without a domain counterpart
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use roost_auth::{Hs256TokenCodec, TokenCodec};
use roost_store::Datastore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Seeds the country reference set before serving, so `/countries` is
/// populated on both backends from the first request.
pub async fn build_app(store: Arc<dyn Datastore>, jwt_secret: String) -> Router {
    let tokens: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        tokens: tokens.clone(),
    };

    let services = Arc::new(services::AppServices::new(store, tokens));
    services
        .seed_countries()
        .await
        .expect("failed to seed countries");

    // Protected routes: bearer token verified in middleware, admin gate in
    // the handlers.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services.clone())),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/login", post(routes::session::login))
        .layer(Extension(services))
        .merge(protected)
}
