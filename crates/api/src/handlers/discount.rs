//! Handlers for the `/discounts` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::error::CoreError;
use storefront_core::pagination::ListResponse;
use storefront_core::types::DbId;
use storefront_db::models::discount::{CreateDiscount, Discount, UpdateDiscount};
use storefront_db::repositories::DiscountRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::query::PageQuery;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "discount",
        id,
    })
}

/// GET /v1/discounts
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<ListResponse<Discount>>> {
    let page = params.page();
    let discounts = DiscountRepo::list(&state.pool, page).await?;
    let count = DiscountRepo::count(&state.pool).await?;
    Ok(Json(ListResponse::new(page, count, discounts)))
}

/// GET /v1/discount/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Discount>> {
    let discount = DiscountRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(discount))
}

/// POST /v1/discount
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateDiscount>,
) -> AppResult<(StatusCode, Json<Discount>)> {
    input.check_consistency()?;
    let discount = DiscountRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

/// PATCH /v1/discount/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidJson(input): ValidJson<UpdateDiscount>,
) -> AppResult<Json<Discount>> {
    let discount = DiscountRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(discount))
}

/// DELETE /v1/discount/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Discount>> {
    let discount = DiscountRepo::archive(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(discount))
}
