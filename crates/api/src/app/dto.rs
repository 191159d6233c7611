use serde::Deserialize;

// Entity create/update payloads deserialize straight into the domain
// input types (`NewUser`, `UpdateCity`, ...). Only payloads without a
// domain counterpart live here.

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
