//! Repository for the `product_roots` table.

use sqlx::{PgConnection, PgPool};
use storefront_core::pagination::Page;
use storefront_core::types::{DbId, Timestamp};

use crate::models::product::CreateProduct;
use crate::models::product_root::ProductRoot;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, subtitle, description, sku_prefix, manufacturer, brand, \
    taxable, cost, product_weight, product_height, product_width, product_length, \
    package_weight, package_height, package_width, package_length, quantity_per_package, \
    primary_image_id, available_on, created_on, updated_on, archived_on";

/// Provides CRUD operations for product roots.
pub struct ProductRootRepo;

impl ProductRootRepo {
    /// Insert a root from a creation request. `input.sku` becomes the prefix.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateProduct,
        available_on: Timestamp,
    ) -> Result<ProductRoot, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_roots (name, subtitle, description, sku_prefix, manufacturer, \
                brand, taxable, cost, product_weight, product_height, product_width, \
                product_length, package_weight, package_height, package_width, package_length, \
                quantity_per_package, available_on)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             RETURNING {COLUMNS}"
        );
        let d = &input.dimensions;
        sqlx::query_as::<_, ProductRoot>(&query)
            .bind(&input.name)
            .bind(&input.subtitle)
            .bind(&input.description)
            .bind(&input.sku)
            .bind(&input.manufacturer)
            .bind(&input.brand)
            .bind(input.taxable)
            .bind(input.cost)
            .bind(d.product_weight)
            .bind(d.product_height)
            .bind(d.product_width)
            .bind(d.product_length)
            .bind(d.package_weight)
            .bind(d.package_height)
            .bind(d.package_width)
            .bind(d.package_length)
            .bind(input.quantity_per_package.max(1))
            .bind(available_on)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a live root by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProductRoot>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM product_roots WHERE id = $1 AND archived_on IS NULL");
        sqlx::query_as::<_, ProductRoot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a live root already uses `sku_prefix`.
    pub async fn sku_prefix_exists(pool: &PgPool, sku_prefix: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM product_roots WHERE sku_prefix = $1 AND archived_on IS NULL)",
        )
        .bind(sku_prefix)
        .fetch_one(pool)
        .await
    }

    /// One page of live roots, oldest first.
    pub async fn list(pool: &PgPool, page: Page) -> Result<Vec<ProductRoot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_roots WHERE archived_on IS NULL
             ORDER BY id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ProductRoot>(&query)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM product_roots WHERE archived_on IS NULL")
            .fetch_one(pool)
            .await
    }

    pub async fn set_primary_image(
        conn: &mut PgConnection,
        id: DbId,
        image_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE product_roots SET primary_image_id = $2 WHERE id = $1")
            .bind(id)
            .bind(image_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Archive a root. Returns the archived row, or `None` if it was not live.
    pub async fn archive(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ProductRoot>, sqlx::Error> {
        let query = format!(
            "UPDATE product_roots SET archived_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRoot>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}
