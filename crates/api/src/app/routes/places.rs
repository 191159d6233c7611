use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use roost_core::{AmenityId, PlaceId};
use roost_listings::{NewPlace, UpdatePlace};

use crate::app::{errors, services::AppServices};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_places).post(create_place))
        .route("/:id", get(get_place).put(update_place).delete(delete_place))
        .route("/:id/reviews", get(list_place_reviews))
        .route("/:id/amenities", get(list_place_amenities))
        .route(
            "/:id/amenities/:amenity_id",
            post(attach_amenity).delete(detach_amenity),
        )
}

pub async fn create_place(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<NewPlace>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.create_place(body).await {
        Ok(place) => (StatusCode::CREATED, Json(place)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_places(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.list_places().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_place(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: PlaceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid place id")
        }
    };

    match services.get_place(id).await {
        Ok(place) => (StatusCode::OK, Json(place)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_place(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePlace>, JsonRejection>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: PlaceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid place id")
        }
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.update_place(id, body).await {
        Ok(place) => (StatusCode::OK, Json(place)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_place(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: PlaceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid place id")
        }
    };

    match services.delete_place(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_place_reviews(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: PlaceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid place id")
        }
    };

    match services.reviews_for_place(id).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_place_amenities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let id: PlaceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid place id")
        }
    };

    match services.amenities_for_place(id).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn attach_amenity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path((id, amenity_id)): Path<(String, String)>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let place_id: PlaceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid place id")
        }
    };
    let amenity_id: AmenityId = match amenity_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid amenity id")
        }
    };

    match services.attach_amenity(place_id, amenity_id).await {
        Ok(link) => (StatusCode::CREATED, Json(link)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn detach_amenity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthContext>,
    Path((id, amenity_id)): Path<(String, String)>,
) -> axum::response::Response {
    if let Err(e) = crate::authz::authorize_admin(&auth) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }
    let place_id: PlaceId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid place id")
        }
    };
    let amenity_id: AmenityId = match amenity_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid amenity id")
        }
    };

    match services.detach_amenity(place_id, amenity_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
