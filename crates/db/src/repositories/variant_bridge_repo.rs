//! Repository for the `product_variant_bridge` table.

use sqlx::PgConnection;
use storefront_core::types::DbId;

/// Links products to the option values that produced them.
pub struct VariantBridgeRepo;

impl VariantBridgeRepo {
    /// Insert one bridge row per option value in a single statement.
    pub async fn create_many(
        conn: &mut PgConnection,
        product_id: DbId,
        product_option_value_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if product_option_value_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO product_variant_bridge (product_id, product_option_value_id)
             SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(product_id)
        .bind(product_option_value_ids)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn archive_by_product(
        conn: &mut PgConnection,
        product_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE product_variant_bridge SET archived_on = NOW()
             WHERE product_id = $1 AND archived_on IS NULL",
        )
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn archive_by_root(
        conn: &mut PgConnection,
        product_root_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE product_variant_bridge SET archived_on = NOW()
             WHERE archived_on IS NULL AND product_id IN
                (SELECT id FROM products WHERE product_root_id = $1)",
        )
        .bind(product_root_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
