//! `roost-auth` — pure authentication/authorization boundary.
//!
//! Token claims, the HS256 codec, password hashing and the admin policy
//! check live here. This crate is intentionally decoupled from HTTP and
//! storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod token;

pub use authorize::{AuthzError, require_admin};
pub use claims::{AccessClaims, TOKEN_TTL_SECS, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use token::{Hs256TokenCodec, TokenCodec, TokenError};
