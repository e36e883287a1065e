//! Handlers for product roots and the product creation flow.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use storefront_core::error::CoreError;
use storefront_core::event_types;
use storefront_core::pagination::ListResponse;
use storefront_core::types::DbId;
use storefront_core::validation::ensure_unique_names;
use storefront_core::variants::ensure_variant_limit;
use storefront_db::catalog;
use storefront_db::models::option::ProductOption;
use storefront_db::models::product::{CreateProduct, Product};
use storefront_db::models::product_root::{ProductRoot, ProductRootDetail, ProductRootSummary};
use storefront_db::repositories::{
    ProductImageRepo, ProductOptionRepo, ProductOptionValueRepo, ProductRepo, ProductRootRepo,
    VariantBridgeRepo,
};
use storefront_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::handlers::product::attach_applicable_options;
use crate::handlers::publish_event;
use crate::images::resolve_images;
use crate::query::PageQuery;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "product root",
        id,
    })
}

/// Fill `values` on each option, in value creation order.
pub(crate) async fn attach_option_values(
    pool: &DbPool,
    options: &mut [ProductOption],
) -> Result<(), sqlx::Error> {
    if options.is_empty() {
        return Ok(());
    }
    let ids: Vec<DbId> = options.iter().map(|o| o.id).collect();
    let mut by_option: HashMap<DbId, Vec<_>> = HashMap::new();
    for value in ProductOptionValueRepo::list_by_options(pool, &ids).await? {
        by_option.entry(value.product_option_id).or_default().push(value);
    }
    for option in options.iter_mut() {
        option.values = by_option.remove(&option.id).unwrap_or_default();
    }
    Ok(())
}

async fn load_detail(pool: &DbPool, root: ProductRoot) -> Result<ProductRootDetail, sqlx::Error> {
    let mut options = ProductOptionRepo::list_all_by_root(pool, root.id).await?;
    attach_option_values(pool, &mut options).await?;
    let images = ProductImageRepo::list_by_root(pool, root.id).await?;
    let mut products = ProductRepo::list_by_roots(pool, &[root.id]).await?;
    attach_applicable_options(pool, &mut products).await?;
    Ok(ProductRootDetail {
        root,
        options,
        images,
        products,
    })
}

/// POST /v1/product
///
/// Creates a root, its images, options and values, and one product per
/// combination of option values, all in one transaction.
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateProduct>,
) -> AppResult<(StatusCode, Json<ProductRootDetail>)> {
    ensure_unique_names(input.options.iter().map(|o| o.name.as_str()))?;
    ensure_variant_limit(input.options.iter().map(|o| o.values.len()))?;
    let input = input.with_defaults(Utc::now());

    if ProductRootRepo::sku_prefix_exists(&state.pool, &input.sku).await? {
        return Err(CoreError::Conflict(format!(
            "product with sku '{}' already exists",
            input.sku
        ))
        .into());
    }

    let images = resolve_images(
        &state.http_client,
        Arc::clone(&state.image_storer),
        &input.images,
    )
    .await?;

    let mut tx = state.pool.begin().await?;
    let detail =
        catalog::create_product_root(&mut *tx, state.image_storer.as_ref(), &input, images)
            .await?;
    tx.commit().await?;

    tracing::info!(
        product_root_id = detail.root.id,
        sku_prefix = %detail.root.sku_prefix,
        product_count = detail.products.len(),
        "Product root created"
    );
    publish_event(&state, event_types::PRODUCT_CREATED, &detail);
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /v1/product_roots
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<ProductRootSummary>>> {
    let page = params.page();
    let roots = ProductRootRepo::list(&state.pool, page).await?;
    let count = ProductRootRepo::count(&state.pool).await?;

    let ids: Vec<DbId> = roots.iter().map(|r| r.id).collect();
    let mut products = if ids.is_empty() {
        Vec::new()
    } else {
        ProductRepo::list_by_roots(&state.pool, &ids).await?
    };
    attach_applicable_options(&state.pool, &mut products).await?;

    let mut by_root: HashMap<DbId, Vec<Product>> = HashMap::new();
    for product in products {
        by_root.entry(product.product_root_id).or_default().push(product);
    }
    let data = roots
        .into_iter()
        .map(|root| ProductRootSummary {
            products: by_root.remove(&root.id).unwrap_or_default(),
            root,
        })
        .collect();

    Ok(Json(ListResponse::new(page, count, data)))
}

/// GET /v1/product_root/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductRootDetail>> {
    let root = ProductRootRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(load_detail(&state.pool, root).await?))
}

/// DELETE /v1/product_root/{id}
///
/// Archives the root and everything it owns in one transaction.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductRoot>> {
    let mut tx = state.pool.begin().await?;
    VariantBridgeRepo::archive_by_root(&mut tx, id).await?;
    ProductOptionValueRepo::archive_by_root(&mut tx, id).await?;
    ProductOptionRepo::archive_by_root(&mut tx, id).await?;
    let products = ProductRepo::archive_by_root(&mut tx, id).await?;
    ProductImageRepo::archive_by_root(&mut tx, id).await?;
    let root = ProductRootRepo::archive(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    tracing::info!(product_root_id = id, products, "Product root archived");
    Ok(Json(root))
}
