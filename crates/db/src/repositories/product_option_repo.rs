//! Repository for the `product_options` table.

use sqlx::{PgConnection, PgPool};
use storefront_core::pagination::Page;
use storefront_core::types::DbId;

use crate::models::option::ProductOption;

const COLUMNS: &str = "id, name, product_root_id, created_on, updated_on, archived_on";

/// Provides CRUD operations for product options.
///
/// Rows come back with an empty `values` list; callers attach values via
/// [`ProductOptionValueRepo::list_by_options`](super::ProductOptionValueRepo::list_by_options).
pub struct ProductOptionRepo;

impl ProductOptionRepo {
    pub async fn create(
        conn: &mut PgConnection,
        product_root_id: DbId,
        name: &str,
    ) -> Result<ProductOption, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_options (name, product_root_id) VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductOption>(&query)
            .bind(name)
            .bind(product_root_id)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProductOption>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM product_options WHERE id = $1 AND archived_on IS NULL");
        sqlx::query_as::<_, ProductOption>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every live option of a root, in declaration order.
    pub async fn list_all_by_root(
        pool: &PgPool,
        product_root_id: DbId,
    ) -> Result<Vec<ProductOption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_options
             WHERE product_root_id = $1 AND archived_on IS NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, ProductOption>(&query)
            .bind(product_root_id)
            .fetch_all(pool)
            .await
    }

    /// One page of a root's live options, in declaration order.
    pub async fn list_by_root(
        pool: &PgPool,
        product_root_id: DbId,
        page: Page,
    ) -> Result<Vec<ProductOption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_options
             WHERE product_root_id = $1 AND archived_on IS NULL
             ORDER BY id LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ProductOption>(&query)
            .bind(product_root_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_root(pool: &PgPool, product_root_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_options
             WHERE product_root_id = $1 AND archived_on IS NULL",
        )
        .bind(product_root_id)
        .fetch_one(pool)
        .await
    }

    /// Whether a root already has a live option called `name`.
    pub async fn name_exists_for_root(
        pool: &PgPool,
        product_root_id: DbId,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM product_options
             WHERE product_root_id = $1 AND name = $2 AND archived_on IS NULL)",
        )
        .bind(product_root_id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Rename an option. Returns `None` if it is not live.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<ProductOption>, sqlx::Error> {
        let query = format!(
            "UPDATE product_options SET name = $2, updated_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductOption>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn archive(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ProductOption>, sqlx::Error> {
        let query = format!(
            "UPDATE product_options SET archived_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductOption>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn archive_by_root(
        conn: &mut PgConnection,
        product_root_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE product_options SET archived_on = NOW()
             WHERE product_root_id = $1 AND archived_on IS NULL",
        )
        .bind(product_root_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
