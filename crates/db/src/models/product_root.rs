//! Product root model.
//!
//! Roots are created through [`CreateProduct`](crate::models::product::CreateProduct)
//! and never updated directly; they are only archived.

use serde::Serialize;
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};

use crate::models::image::ProductImage;
use crate::models::option::ProductOption;
use crate::models::product::{Dimensions, Product};

/// A row from the `product_roots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductRoot {
    pub id: DbId,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub sku_prefix: String,
    pub manufacturer: String,
    pub brand: String,
    pub taxable: bool,
    pub cost: f64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub dimensions: Dimensions,
    pub quantity_per_package: i32,
    pub primary_image_id: Option<DbId>,
    pub available_on: Timestamp,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
}

/// A root together with everything it owns.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRootDetail {
    #[serde(flatten)]
    pub root: ProductRoot,
    pub options: Vec<ProductOption>,
    pub images: Vec<ProductImage>,
    pub products: Vec<Product>,
}

/// List entry for `GET /v1/product_roots`: the root and its products.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRootSummary {
    #[serde(flatten)]
    pub root: ProductRoot,
    pub products: Vec<Product>,
}
