//! Repository for the `product_images` table.

use sqlx::{PgConnection, PgPool};
use storefront_core::types::DbId;

use crate::models::image::{NewProductImage, ProductImage};

const COLUMNS: &str = "id, product_root_id, thumbnail_url, main_url, original_url, source_url, \
    created_on, updated_on, archived_on";

pub struct ProductImageRepo;

impl ProductImageRepo {
    pub async fn create(
        conn: &mut PgConnection,
        image: &NewProductImage,
    ) -> Result<ProductImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_images (product_root_id, thumbnail_url, main_url, original_url, source_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductImage>(&query)
            .bind(image.product_root_id)
            .bind(&image.thumbnail_url)
            .bind(&image.main_url)
            .bind(&image.original_url)
            .bind(&image.source_url)
            .fetch_one(&mut *conn)
            .await
    }

    /// Live images of a root, in upload order.
    pub async fn list_by_root(
        pool: &PgPool,
        product_root_id: DbId,
    ) -> Result<Vec<ProductImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_images
             WHERE product_root_id = $1 AND archived_on IS NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, ProductImage>(&query)
            .bind(product_root_id)
            .fetch_all(pool)
            .await
    }

    pub async fn archive_by_root(
        conn: &mut PgConnection,
        product_root_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE product_images SET archived_on = NOW()
             WHERE product_root_id = $1 AND archived_on IS NULL",
        )
        .bind(product_root_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
