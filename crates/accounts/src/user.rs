use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roost_auth::{hash_password, verify_password};
use roost_core::{DomainError, DomainResult, Entity, UserId};

/// A registered user account.
///
/// `password_hash` holds the salted Argon2id hash and is skipped by the
/// serializer, so the stored credential never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user. The plaintext password is consumed here and
/// hashed; it is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub is_admin: Option<bool>,
}

/// Patch for an existing user. Absent fields keep their value; `username`
/// is not part of the allow-list and cannot change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl User {
    /// Validate the input, hash the password and mint a fresh record.
    pub fn create(input: NewUser) -> DomainResult<Self> {
        let email = normalize_email(&input.email)?;
        let username = required("username", &input.username)?;
        let first_name = required("first_name", &input.first_name)?;
        let last_name = required("last_name", &input.last_name)?;
        if input.password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }
        let password_hash = hash_password(&input.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            email,
            username,
            first_name,
            last_name,
            password_hash,
            is_admin: input.is_admin.unwrap_or(false),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch. Every present field is validated before anything is
    /// written, so a failed patch leaves the record untouched.
    pub fn apply(&mut self, patch: UpdateUser) -> DomainResult<()> {
        let email = match &patch.email {
            Some(raw) => Some(normalize_email(raw)?),
            None => None,
        };
        let first_name = match &patch.first_name {
            Some(raw) => Some(required("first_name", raw)?),
            None => None,
        };
        let last_name = match &patch.last_name {
            Some(raw) => Some(required("last_name", raw)?),
            None => None,
        };
        let password_hash = match &patch.password {
            Some(plain) if plain.is_empty() => {
                return Err(DomainError::validation("password cannot be empty"));
            }
            Some(plain) => Some(
                hash_password(plain).map_err(|e| DomainError::validation(e.to_string()))?,
            ),
            None => None,
        };

        if let Some(email) = email {
            self.email = email;
        }
        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(password_hash) = password_hash {
            self.password_hash = password_hash;
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check a login candidate against the stored hash. A hash that fails
    /// to parse denies, it never panics.
    pub fn check_password(&self, candidate: &str) -> bool {
        verify_password(candidate, &self.password_hash).unwrap_or(false)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Emails are matched case-insensitively store-wide, so the canonical form
/// is trimmed + lowercased.
fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::validation("email cannot be empty"));
    }
    if !email.contains('@') {
        return Err(DomainError::validation(format!(
            "email '{email}' must contain '@'"
        )));
    }
    Ok(email)
}

fn required(field: &str, raw: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            email: "Alice@Example.COM ".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            password: "hunter2".to_string(),
            is_admin: None,
        }
    }

    #[test]
    fn create_user_success() {
        let user = User::create(new_user()).unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.username, "alice");
        assert!(!user.is_admin);
        assert_eq!(user.created_at, user.updated_at);
        assert!(user.check_password("hunter2"));
        assert!(!user.check_password("hunter3"));
    }

    #[test]
    fn create_rejects_email_without_at() {
        let mut input = new_user();
        input.email = "not-an-email".to_string();
        let err = User::create(input).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_blank_names() {
        for field in ["username", "first_name", "last_name"] {
            let mut input = new_user();
            match field {
                "username" => input.username = "   ".to_string(),
                "first_name" => input.first_name = String::new(),
                _ => input.last_name = " ".to_string(),
            }
            let err = User::create(input).unwrap_err();
            assert!(err.to_string().contains(field), "field: {field}");
        }
    }

    #[test]
    fn create_rejects_empty_password() {
        let mut input = new_user();
        input.password = String::new();
        assert!(User::create(input).is_err());
    }

    #[test]
    fn patch_updates_only_present_fields() {
        let mut user = User::create(new_user()).unwrap();
        let before = user.clone();

        user.apply(UpdateUser {
            first_name: Some("Alicia".to_string()),
            is_admin: Some(true),
            ..UpdateUser::default()
        })
        .unwrap();

        assert_eq!(user.first_name, "Alicia");
        assert!(user.is_admin);
        assert_eq!(user.email, before.email);
        assert_eq!(user.username, before.username);
        assert_eq!(user.password_hash, before.password_hash);
        assert_eq!(user.created_at, before.created_at);
        assert!(user.updated_at >= before.updated_at);
    }

    #[test]
    fn patch_rehashes_password() {
        let mut user = User::create(new_user()).unwrap();
        let old_hash = user.password_hash.clone();

        user.apply(UpdateUser {
            password: Some("correct horse".to_string()),
            ..UpdateUser::default()
        })
        .unwrap();

        assert_ne!(user.password_hash, old_hash);
        assert!(user.check_password("correct horse"));
        assert!(!user.check_password("hunter2"));
    }

    #[test]
    fn failed_patch_leaves_record_untouched() {
        let mut user = User::create(new_user()).unwrap();
        let before = user.clone();

        let err = user
            .apply(UpdateUser {
                first_name: Some("Alicia".to_string()),
                email: Some("broken".to_string()),
                ..UpdateUser::default()
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(user, before);
    }

    #[test]
    fn serialized_form_never_contains_the_hash() {
        let user = User::create(new_user()).unwrap();
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert!(value.get("password").is_none());
        assert_eq!(value["email"], serde_json::json!("alice@example.com"));
        assert_eq!(value["is_admin"], serde_json::json!(false));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            #[test]
            fn email_normalisation_is_idempotent(
                local in "[A-Za-z0-9._]{1,16}",
                domain in "[A-Za-z0-9]{1,12}\\.[A-Za-z]{2,3}",
            ) {
                let raw = format!("  {local}@{domain} ");
                let once = normalize_email(&raw).unwrap();
                let twice = normalize_email(&once).unwrap();
                prop_assert_eq!(&once, &twice);
                prop_assert_eq!(once.clone(), once.to_lowercase());
            }

            #[test]
            fn trimmed_nonempty_names_always_pass(name in "[A-Za-z][A-Za-z '-]{0,30}") {
                prop_assert!(required("first_name", &name).is_ok());
            }
        }
    }
}
