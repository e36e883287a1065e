//! Repository for the `users` table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::user::{CreateUser, UpdateUser, User};

const COLUMNS: &str = "id, first_name, last_name, username, email, password_hash, is_admin, \
    password_last_changed_on, created_on, updated_on, archived_on";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (first_name, last_name, username, email, password_hash, is_admin, \
                password_last_changed_on)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.is_admin)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND archived_on IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a live user other than `except_id` holds `username`.
    pub async fn username_taken(
        pool: &PgPool,
        username: &str,
        except_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users
             WHERE username = $1 AND archived_on IS NULL AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(username)
        .bind(except_id)
        .fetch_one(pool)
        .await
    }

    /// Update a user. A new `password_hash` also stamps `password_last_changed_on`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                username = COALESCE($4, username),
                email = COALESCE($5, email),
                is_admin = COALESCE($6, is_admin),
                password_hash = COALESCE($7, password_hash),
                password_last_changed_on = CASE WHEN $7::TEXT IS NULL
                    THEN password_last_changed_on ELSE NOW() END,
                updated_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.username)
            .bind(&input.email)
            .bind(input.is_admin)
            .bind(&input.password_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn archive(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET archived_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
