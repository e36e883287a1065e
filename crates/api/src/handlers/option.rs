//! Handlers for product options and option values.
//!
//! Adding an option or value to an existing root does not generate new
//! products; products are only created with their root.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::pagination::ListResponse;
use storefront_core::types::DbId;
use storefront_db::models::option::{
    CreateProductOption, OptionValueInput, ProductOption, ProductOptionValue, UpdateProductOption,
};
use storefront_db::repositories::{ProductOptionRepo, ProductOptionValueRepo, ProductRootRepo};

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::handlers::product_root::attach_option_values;
use crate::query::PageQuery;
use crate::state::AppState;

fn option_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "product option",
        id,
    })
}

fn value_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "product option value",
        id,
    })
}

fn duplicate_option(name: &str) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "product option with the name '{name}' already exists"
    )))
}

fn duplicate_value(value: &str, option_id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "product option value '{value}' already exists for option ID {option_id}"
    )))
}

async fn ensure_root_exists(state: &AppState, root_id: DbId) -> AppResult<()> {
    ProductRootRepo::find_by_id(&state.pool, root_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "product root",
            id: root_id,
        }))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// GET /v1/product_root/{id}/options
pub async fn list_by_root(
    State(state): State<AppState>,
    Path(root_id): Path<DbId>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<ProductOption>>> {
    ensure_root_exists(&state, root_id).await?;
    let page = params.page();
    let mut options = ProductOptionRepo::list_by_root(&state.pool, root_id, page).await?;
    let count = ProductOptionRepo::count_by_root(&state.pool, root_id).await?;
    attach_option_values(&state.pool, &mut options).await?;
    Ok(Json(ListResponse::new(page, count, options)))
}

/// POST /v1/product_root/{id}/options
pub async fn create(
    State(state): State<AppState>,
    Path(root_id): Path<DbId>,
    ValidJson(input): ValidJson<CreateProductOption>,
) -> AppResult<(StatusCode, Json<ProductOption>)> {
    ensure_root_exists(&state, root_id).await?;
    if ProductOptionRepo::name_exists_for_root(&state.pool, root_id, &input.name).await? {
        return Err(duplicate_option(&input.name));
    }

    let mut tx = state.pool.begin().await?;
    let mut option = ProductOptionRepo::create(&mut tx, root_id, &input.name).await?;
    for value in &input.values {
        let value = ProductOptionValueRepo::create(&mut tx, option.id, value).await?;
        option.values.push(value);
    }
    tx.commit().await?;

    tracing::info!(
        product_root_id = root_id,
        option_id = option.id,
        value_count = option.values.len(),
        "Product option created"
    );
    Ok((StatusCode::CREATED, Json(option)))
}

/// PATCH /v1/product_options/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateProductOption>,
) -> AppResult<Json<ProductOption>> {
    let existing = ProductOptionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| option_not_found(id))?;

    if input.name != existing.name
        && ProductOptionRepo::name_exists_for_root(&state.pool, existing.product_root_id, &input.name)
            .await?
    {
        return Err(duplicate_option(&input.name));
    }

    let mut option = ProductOptionRepo::update(&state.pool, id, &input.name)
        .await?
        .ok_or_else(|| option_not_found(id))?;
    attach_option_values(&state.pool, std::slice::from_mut(&mut option)).await?;
    Ok(Json(option))
}

/// DELETE /v1/product_options/{id}
///
/// Archives the option together with its values.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductOption>> {
    let mut tx = state.pool.begin().await?;
    ProductOptionValueRepo::archive_by_option(&mut tx, id).await?;
    let option = ProductOptionRepo::archive(&mut tx, id)
        .await?
        .ok_or_else(|| option_not_found(id))?;
    tx.commit().await?;

    tracing::info!(option_id = id, "Product option archived");
    Ok(Json(option))
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// POST /v1/product_options/{id}/value
pub async fn create_value(
    State(state): State<AppState>,
    Path(option_id): Path<DbId>,
    ValidJson(input): ValidJson<OptionValueInput>,
) -> AppResult<(StatusCode, Json<ProductOptionValue>)> {
    ProductOptionRepo::find_by_id(&state.pool, option_id)
        .await?
        .ok_or_else(|| option_not_found(option_id))?;
    if ProductOptionValueRepo::value_exists_for_option(&state.pool, option_id, &input.value).await?
    {
        return Err(duplicate_value(&input.value, option_id));
    }

    let mut conn = state.pool.acquire().await?;
    let value = ProductOptionValueRepo::create(&mut conn, option_id, &input.value).await?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// PATCH /v1/product_option_values/{id}
pub async fn update_value(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<OptionValueInput>,
) -> AppResult<Json<ProductOptionValue>> {
    let existing = ProductOptionValueRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| value_not_found(id))?;

    if input.value != existing.value
        && ProductOptionValueRepo::value_exists_for_option(
            &state.pool,
            existing.product_option_id,
            &input.value,
        )
        .await?
    {
        return Err(duplicate_value(&input.value, existing.product_option_id));
    }

    let value = ProductOptionValueRepo::update(&state.pool, id, &input.value)
        .await?
        .ok_or_else(|| value_not_found(id))?;
    Ok(Json(value))
}

/// DELETE /v1/product_option_values/{id}
pub async fn delete_value(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductOptionValue>> {
    let value = ProductOptionValueRepo::archive(&state.pool, id)
        .await?
        .ok_or_else(|| value_not_found(id))?;
    Ok(Json(value))
}
