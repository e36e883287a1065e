//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};
use storefront_core::validation::validate_not_blank;
use validator::Validate;

/// Full user row from the `users` table.
///
/// Contains the password hash; never serialize this to API responses.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub password_last_changed_on: Option<Timestamp>,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
}

/// User representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub password_last_changed_on: Option<Timestamp>,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            password_last_changed_on: user.password_last_changed_on,
            created_on: user.created_on,
            updated_on: user.updated_on,
            archived_on: user.archived_on,
        }
    }
}

/// Body of `POST /v1/user`. Carries the plaintext password.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Insert payload once the password has been hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Body of `PATCH /v1/user/{id}`. All fields are optional.
///
/// Changing `new_password` requires `current_password`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Column changes for a user update.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    pub password_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_omits_password_hash() {
        let user = User {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            is_admin: false,
            password_last_changed_on: None,
            created_on: chrono::Utc::now(),
            updated_on: None,
            archived_on: None,
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ada");
    }

    #[test]
    fn email_is_validated() {
        let request = CreateUserRequest {
            first_name: String::new(),
            last_name: String::new(),
            username: "ada".into(),
            email: "not-an-email".into(),
            password: "long-enough".into(),
            is_admin: false,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
