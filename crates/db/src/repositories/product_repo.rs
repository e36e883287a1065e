//! Repository for the `products` table.

use sqlx::{PgConnection, PgPool};
use storefront_core::pagination::Page;
use storefront_core::types::DbId;

use crate::models::product::{NewProduct, Product, UpdateProduct};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, product_root_id, primary_image_id, name, subtitle, description, \
    option_summary, sku, upc, manufacturer, brand, quantity, taxable, price, on_sale, \
    sale_price, cost, product_weight, product_height, product_width, product_length, \
    package_weight, package_height, package_width, package_length, quantity_per_package, \
    available_on, created_on, updated_on, archived_on";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert one materialized product.
    pub async fn create(conn: &mut PgConnection, p: &NewProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (product_root_id, name, subtitle, description, option_summary, \
                sku, upc, manufacturer, brand, quantity, taxable, price, on_sale, sale_price, \
                cost, product_weight, product_height, product_width, product_length, \
                package_weight, package_height, package_width, package_length, \
                quantity_per_package, available_on)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                $17, $18, $19, $20, $21, $22, $23, $24, $25)
             RETURNING {COLUMNS}"
        );
        let d = &p.dimensions;
        sqlx::query_as::<_, Product>(&query)
            .bind(p.product_root_id)
            .bind(&p.name)
            .bind(&p.subtitle)
            .bind(&p.description)
            .bind(&p.option_summary)
            .bind(&p.sku)
            .bind(&p.upc)
            .bind(&p.manufacturer)
            .bind(&p.brand)
            .bind(p.quantity)
            .bind(p.taxable)
            .bind(p.price)
            .bind(p.on_sale)
            .bind(p.sale_price)
            .bind(p.cost)
            .bind(d.product_weight)
            .bind(d.product_height)
            .bind(d.product_width)
            .bind(d.product_length)
            .bind(d.package_weight)
            .bind(d.package_height)
            .bind(d.package_width)
            .bind(d.package_length)
            .bind(p.quantity_per_package)
            .bind(p.available_on)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a live product by SKU.
    pub async fn find_by_sku(pool: &PgPool, sku: &str) -> Result<Option<Product>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM products WHERE sku = $1 AND archived_on IS NULL");
        sqlx::query_as::<_, Product>(&query)
            .bind(sku)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists_by_sku(pool: &PgPool, sku: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND archived_on IS NULL)",
        )
        .bind(sku)
        .fetch_one(pool)
        .await
    }

    /// One page of live products, in creation order.
    pub async fn list(pool: &PgPool, page: Page) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products WHERE archived_on IS NULL
             ORDER BY id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE archived_on IS NULL")
            .fetch_one(pool)
            .await
    }

    /// All live products of the given roots, in creation order.
    pub async fn list_by_roots(
        pool: &PgPool,
        product_root_ids: &[DbId],
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE product_root_id = ANY($1) AND archived_on IS NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(product_root_ids)
            .fetch_all(pool)
            .await
    }

    /// Update a product. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                subtitle = COALESCE($3, subtitle),
                description = COALESCE($4, description),
                sku = COALESCE($5, sku),
                upc = COALESCE($6, upc),
                manufacturer = COALESCE($7, manufacturer),
                brand = COALESCE($8, brand),
                quantity = COALESCE($9, quantity),
                quantity_per_package = COALESCE($10, quantity_per_package),
                taxable = COALESCE($11, taxable),
                price = COALESCE($12, price),
                on_sale = COALESCE($13, on_sale),
                sale_price = COALESCE($14, sale_price),
                cost = COALESCE($15, cost),
                product_weight = COALESCE($16, product_weight),
                product_height = COALESCE($17, product_height),
                product_width = COALESCE($18, product_width),
                product_length = COALESCE($19, product_length),
                package_weight = COALESCE($20, package_weight),
                package_height = COALESCE($21, package_height),
                package_width = COALESCE($22, package_width),
                package_length = COALESCE($23, package_length),
                available_on = COALESCE($24, available_on),
                updated_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.subtitle)
            .bind(&input.description)
            .bind(&input.sku)
            .bind(&input.upc)
            .bind(&input.manufacturer)
            .bind(&input.brand)
            .bind(input.quantity)
            .bind(input.quantity_per_package)
            .bind(input.taxable)
            .bind(input.price)
            .bind(input.on_sale)
            .bind(input.sale_price)
            .bind(input.cost)
            .bind(input.product_weight)
            .bind(input.product_height)
            .bind(input.product_width)
            .bind(input.product_length)
            .bind(input.package_weight)
            .bind(input.package_height)
            .bind(input.package_width)
            .bind(input.package_length)
            .bind(input.available_on)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_primary_image(
        conn: &mut PgConnection,
        id: DbId,
        image_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE products SET primary_image_id = $2 WHERE id = $1")
            .bind(id)
            .bind(image_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Archive a product. Returns the archived row, or `None` if it was not live.
    pub async fn archive(conn: &mut PgConnection, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET archived_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Archive every live product of a root. Returns the number archived.
    pub async fn archive_by_root(
        conn: &mut PgConnection,
        product_root_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products SET archived_on = NOW()
             WHERE product_root_id = $1 AND archived_on IS NULL",
        )
        .bind(product_root_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}
