//! Product image model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};
use storefront_core::validation::validate_not_blank;
use validator::Validate;

/// A row from the `product_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductImage {
    pub id: DbId,
    pub product_root_id: DbId,
    pub thumbnail_url: String,
    pub main_url: String,
    pub original_url: String,
    /// URL the image was fetched from; empty for base64 uploads.
    pub source_url: String,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
}

/// An image attached to a product creation request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductImageInput {
    /// `base64` or `url`.
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub data: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// Insert payload for an image whose renditions are already stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductImage {
    pub product_root_id: DbId,
    pub thumbnail_url: String,
    pub main_url: String,
    pub original_url: String,
    pub source_url: String,
}
