use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::{dto, errors};
use crate::app::services::{AppServices, LoginError};

/// `POST /login` — the only route besides `/health` outside the token wall.
///
/// The 401 body is plain text, not the JSON envelope, and does not say
/// whether the username or the password was wrong.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    match services.login(&body.username, &body.password).await {
        Ok(token) => (
            StatusCode::OK,
            Json(serde_json::json!({ "access_token": token })),
        )
            .into_response(),
        Err(LoginError::InvalidCredentials) => {
            (StatusCode::UNAUTHORIZED, "Wrong username or password").into_response()
        }
        Err(LoginError::Store(e)) => errors::store_error_to_response(e),
        Err(LoginError::Token(e)) => {
            tracing::error!("token issue failed: {e}");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}
