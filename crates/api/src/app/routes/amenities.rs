use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use roost_core::AmenityId;
use roost_listings::{NewAmenity, UpdateAmenity};

use crate::app::{errors, services::AppServices};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_amenities).post(create_amenity))
        .route(
            "/:id",
            get(get_amenity).put(update_amenity).delete(delete_amenity),
        )
}

pub async fn create_amenity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<NewAmenity>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.create_amenity(body).await {
        Ok(amenity) => (StatusCode::CREATED, Json(amenity)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_amenities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.list_amenities().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_amenity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: AmenityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid amenity id")
        }
    };

    match services.get_amenity(id).await {
        Ok(amenity) => (StatusCode::OK, Json(amenity)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_amenity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateAmenity>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: AmenityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid amenity id")
        }
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.update_amenity(id, body).await {
        Ok(amenity) => (StatusCode::OK, Json(amenity)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_amenity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: AmenityId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid amenity id")
        }
    };

    match services.delete_amenity(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
