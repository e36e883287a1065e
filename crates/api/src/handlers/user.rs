//! Handlers for the `/user` resource.
//!
//! Passwords are hashed with Argon2id before they reach the database, and
//! responses use [`UserResponse`] so the hash never leaves the server.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::types::DbId;
use storefront_core::validation::validate_password_strength;
use storefront_db::models::user::{
    CreateUser, CreateUserRequest, UpdateUser, UpdateUserRequest, UserResponse,
};
use storefront_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::password::{hash_password, verify_password};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "user", id })
}

fn username_taken(username: &str) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "user with username '{username}' already exists"
    )))
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

/// POST /v1/user
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    validate_password_strength(&input.password, state.config.min_password_length)?;

    if UserRepo::username_taken(&state.pool, &input.username, None).await? {
        return Err(username_taken(&input.username));
    }

    let password_hash = hash(&input.password)?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            first_name: input.first_name,
            last_name: input.last_name,
            username: input.username,
            email: input.email,
            password_hash,
            is_admin: input.is_admin,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /v1/user/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(UserResponse::from(user)))
}

/// PATCH /v1/user/{id}
///
/// Setting `new_password` requires `current_password` to match.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let existing = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(username) = input.username.as_deref() {
        if UserRepo::username_taken(&state.pool, username, Some(id)).await? {
            return Err(username_taken(username));
        }
    }

    let password_hash = match input.new_password.as_deref() {
        None => None,
        Some(new_password) => {
            let current = input.current_password.as_deref().ok_or_else(|| {
                AppError::BadRequest(
                    "current_password is required to change the password".into(),
                )
            })?;
            let matches = verify_password(current, &existing.password_hash).map_err(|e| {
                AppError::InternalError(format!("Stored password hash is unreadable: {e}"))
            })?;
            if !matches {
                return Err(AppError::BadRequest("current password is incorrect".into()));
            }
            validate_password_strength(new_password, state.config.min_password_length)?;
            Some(hash(new_password)?)
        }
    };

    let changes = UpdateUser {
        first_name: input.first_name,
        last_name: input.last_name,
        username: input.username,
        email: input.email,
        is_admin: input.is_admin,
        password_hash,
    };
    let user = UserRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /v1/user/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::archive(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(UserResponse::from(user)))
}
