//! Repository for the `product_option_values` table.

use sqlx::{PgConnection, PgPool};
use storefront_core::types::DbId;

use crate::models::option::{BridgedOptionValue, ProductOptionValue};

const COLUMNS: &str = "id, product_option_id, value, created_on, updated_on, archived_on";

/// Same columns qualified with the `v` alias, for joins.
const JOINED_COLUMNS: &str =
    "v.id, v.product_option_id, v.value, v.created_on, v.updated_on, v.archived_on";

/// Provides CRUD operations for option values.
pub struct ProductOptionValueRepo;

impl ProductOptionValueRepo {
    pub async fn create(
        conn: &mut PgConnection,
        product_option_id: DbId,
        value: &str,
    ) -> Result<ProductOptionValue, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_option_values (product_option_id, value) VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductOptionValue>(&query)
            .bind(product_option_id)
            .bind(value)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductOptionValue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_option_values WHERE id = $1 AND archived_on IS NULL"
        );
        sqlx::query_as::<_, ProductOptionValue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Live values of the given options, grouped by option then creation order.
    pub async fn list_by_options(
        pool: &PgPool,
        product_option_ids: &[DbId],
    ) -> Result<Vec<ProductOptionValue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_option_values
             WHERE product_option_id = ANY($1) AND archived_on IS NULL
             ORDER BY product_option_id, id"
        );
        sqlx::query_as::<_, ProductOptionValue>(&query)
            .bind(product_option_ids)
            .fetch_all(pool)
            .await
    }

    /// Option values bridged to each of the given products, in option order.
    pub async fn list_by_products(
        pool: &PgPool,
        product_ids: &[DbId],
    ) -> Result<Vec<BridgedOptionValue>, sqlx::Error> {
        let query = format!(
            "SELECT b.product_id, {JOINED_COLUMNS}
             FROM product_variant_bridge b
             JOIN product_option_values v ON v.id = b.product_option_value_id
             WHERE b.product_id = ANY($1) AND b.archived_on IS NULL
             ORDER BY b.product_id, v.product_option_id, v.id"
        );
        sqlx::query_as::<_, BridgedOptionValue>(&query)
            .bind(product_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn value_exists_for_option(
        pool: &PgPool,
        product_option_id: DbId,
        value: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM product_option_values
             WHERE product_option_id = $1 AND value = $2 AND archived_on IS NULL)",
        )
        .bind(product_option_id)
        .bind(value)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        value: &str,
    ) -> Result<Option<ProductOptionValue>, sqlx::Error> {
        let query = format!(
            "UPDATE product_option_values SET value = $2, updated_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductOptionValue>(&query)
            .bind(id)
            .bind(value)
            .fetch_optional(pool)
            .await
    }

    pub async fn archive(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductOptionValue>, sqlx::Error> {
        let query = format!(
            "UPDATE product_option_values SET archived_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductOptionValue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn archive_by_option(
        conn: &mut PgConnection,
        product_option_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE product_option_values SET archived_on = NOW()
             WHERE product_option_id = $1 AND archived_on IS NULL",
        )
        .bind(product_option_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Archive the values of every option belonging to a root.
    pub async fn archive_by_root(
        conn: &mut PgConnection,
        product_root_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE product_option_values SET archived_on = NOW()
             WHERE archived_on IS NULL AND product_option_id IN
                (SELECT id FROM product_options WHERE product_root_id = $1)",
        )
        .bind(product_root_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
