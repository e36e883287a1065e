//! Repository for the `discounts` table.

use sqlx::PgPool;
use storefront_core::pagination::Page;
use storefront_core::types::DbId;

use crate::models::discount::{CreateDiscount, Discount, UpdateDiscount};

const COLUMNS: &str = "id, name, discount_type, amount, starts_on, expires_on, requires_code, \
    code, limited_use, number_of_uses, login_required, created_on, updated_on, archived_on";

/// Provides CRUD operations for discounts.
pub struct DiscountRepo;

impl DiscountRepo {
    /// Insert a discount. `starts_on` defaults to now.
    pub async fn create(pool: &PgPool, input: &CreateDiscount) -> Result<Discount, sqlx::Error> {
        let query = format!(
            "INSERT INTO discounts (name, discount_type, amount, starts_on, expires_on, \
                requires_code, code, limited_use, number_of_uses, login_required)
             VALUES ($1, $2, $3, COALESCE($4, NOW()), $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Discount>(&query)
            .bind(&input.name)
            .bind(&input.discount_type)
            .bind(input.amount)
            .bind(input.starts_on)
            .bind(input.expires_on)
            .bind(input.requires_code)
            .bind(&input.code)
            .bind(input.limited_use)
            .bind(input.number_of_uses)
            .bind(input.login_required)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Discount>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM discounts WHERE id = $1 AND archived_on IS NULL");
        sqlx::query_as::<_, Discount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, page: Page) -> Result<Vec<Discount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discounts WHERE archived_on IS NULL
             ORDER BY id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Discount>(&query)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM discounts WHERE archived_on IS NULL")
            .fetch_one(pool)
            .await
    }

    /// Update a discount. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDiscount,
    ) -> Result<Option<Discount>, sqlx::Error> {
        let query = format!(
            "UPDATE discounts SET
                name = COALESCE($2, name),
                discount_type = COALESCE($3, discount_type),
                amount = COALESCE($4, amount),
                starts_on = COALESCE($5, starts_on),
                expires_on = COALESCE($6, expires_on),
                requires_code = COALESCE($7, requires_code),
                code = COALESCE($8, code),
                limited_use = COALESCE($9, limited_use),
                number_of_uses = COALESCE($10, number_of_uses),
                login_required = COALESCE($11, login_required),
                updated_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Discount>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.discount_type)
            .bind(input.amount)
            .bind(input.starts_on)
            .bind(input.expires_on)
            .bind(input.requires_code)
            .bind(&input.code)
            .bind(input.limited_use)
            .bind(input.number_of_uses)
            .bind(input.login_required)
            .fetch_optional(pool)
            .await
    }

    pub async fn archive(pool: &PgPool, id: DbId) -> Result<Option<Discount>, sqlx::Error> {
        let query = format!(
            "UPDATE discounts SET archived_on = NOW()
             WHERE id = $1 AND archived_on IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Discount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
