use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use roost_geo::CountryCode;

use crate::app::{errors, services::AppServices};
use crate::context::AuthContext;

/// Countries are seeded reference data: list and fetch only. Mutating
/// verbs fall through to axum's automatic 405.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_countries))
        .route("/:code", get(get_country))
        .route("/:code/cities", get(list_country_cities))
}

pub async fn list_countries(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.list_countries().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_country(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(code): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let code: CountryCode = match code.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid country code")
        }
    };

    match services.get_country(&code).await {
        Ok(country) => (StatusCode::OK, Json(country)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_country_cities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(code): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let code: CountryCode = match code.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid country code")
        }
    };

    match services.cities_in_country(&code).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
