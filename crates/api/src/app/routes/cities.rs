use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use roost_core::CityId;
use roost_geo::{NewCity, UpdateCity};

use crate::app::{errors, services::AppServices};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_cities).post(create_city))
        .route("/:id", get(get_city).put(update_city).delete(delete_city))
}

pub async fn create_city(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<NewCity>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.create_city(body).await {
        Ok(city) => (StatusCode::CREATED, Json(city)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_cities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.list_cities().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_city(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: CityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid city id")
        }
    };

    match services.get_city(id).await {
        Ok(city) => (StatusCode::OK, Json(city)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_city(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCity>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: CityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid city id")
        }
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.update_city(id, body).await {
        Ok(city) => (StatusCode::OK, Json(city)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_city(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: CityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid city id")
        }
    };

    match services.delete_city(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
