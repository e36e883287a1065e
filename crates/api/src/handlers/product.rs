//! Handlers for single products (`/v1/products`, `/v1/product/{sku}`).

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::event_types;
use storefront_core::pagination::ListResponse;
use storefront_core::types::DbId;
use storefront_db::models::product::{Product, UpdateProduct};
use storefront_db::repositories::{ProductOptionValueRepo, ProductRepo, VariantBridgeRepo};
use storefront_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::handlers::publish_event;
use crate::query::PageQuery;
use crate::state::AppState;

fn not_found(sku: &str) -> AppError {
    AppError::Core(CoreError::NotFoundBy {
        entity: "product",
        key: "sku",
        value: sku.to_string(),
    })
}

/// Fill `applicable_options` on each product from the bridge table.
pub(crate) async fn attach_applicable_options(
    pool: &DbPool,
    products: &mut [Product],
) -> Result<(), sqlx::Error> {
    if products.is_empty() {
        return Ok(());
    }
    let ids: Vec<DbId> = products.iter().map(|p| p.id).collect();
    let mut by_product: HashMap<DbId, Vec<_>> = HashMap::new();
    for bridged in ProductOptionValueRepo::list_by_products(pool, &ids).await? {
        by_product
            .entry(bridged.product_id)
            .or_default()
            .push(bridged.value);
    }
    for product in products.iter_mut() {
        product.applicable_options = by_product.remove(&product.id).unwrap_or_default();
    }
    Ok(())
}

async fn load_product(pool: &DbPool, sku: &str) -> AppResult<Product> {
    let mut product = ProductRepo::find_by_sku(pool, sku)
        .await?
        .ok_or_else(|| not_found(sku))?;
    attach_applicable_options(pool, std::slice::from_mut(&mut product)).await?;
    Ok(product)
}

/// GET /v1/products
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<Product>>> {
    let page = params.page();
    let mut products = ProductRepo::list(&state.pool, page).await?;
    let count = ProductRepo::count(&state.pool).await?;
    attach_applicable_options(&state.pool, &mut products).await?;
    Ok(Json(ListResponse::new(page, count, products)))
}

/// GET /v1/product/{sku}
pub async fn get_by_sku(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<Product>> {
    Ok(Json(load_product(&state.pool, &sku).await?))
}

/// HEAD /v1/product/{sku}
pub async fn exists(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<StatusCode> {
    if ProductRepo::exists_by_sku(&state.pool, &sku).await? {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// PATCH /v1/product/{sku}
pub async fn update(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    ValidJson(input): ValidJson<UpdateProduct>,
) -> AppResult<Json<Product>> {
    let existing = ProductRepo::find_by_sku(&state.pool, &sku)
        .await?
        .ok_or_else(|| not_found(&sku))?;

    if let Some(new_sku) = input.sku.as_deref() {
        if new_sku != existing.sku && ProductRepo::exists_by_sku(&state.pool, new_sku).await? {
            return Err(CoreError::Conflict(format!(
                "product with sku '{new_sku}' already exists"
            ))
            .into());
        }
    }

    let mut product = ProductRepo::update(&state.pool, existing.id, &input)
        .await?
        .ok_or_else(|| not_found(&sku))?;
    attach_applicable_options(&state.pool, std::slice::from_mut(&mut product)).await?;

    tracing::info!(product_id = product.id, sku = %product.sku, "Product updated");
    publish_event(&state, event_types::PRODUCT_UPDATED, &product);
    Ok(Json(product))
}

/// DELETE /v1/product/{sku}
///
/// Archives the product's bridge rows and the product in one transaction.
pub async fn delete(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<Product>> {
    let existing = load_product(&state.pool, &sku).await?;

    let mut tx = state.pool.begin().await?;
    VariantBridgeRepo::archive_by_product(&mut tx, existing.id).await?;
    let mut product = ProductRepo::archive(&mut tx, existing.id)
        .await?
        .ok_or_else(|| not_found(&sku))?;
    tx.commit().await?;

    product.applicable_options = existing.applicable_options;
    tracing::info!(product_id = product.id, sku = %product.sku, "Product archived");
    publish_event(&state, event_types::PRODUCT_ARCHIVED, &product);
    Ok(Json(product))
}
