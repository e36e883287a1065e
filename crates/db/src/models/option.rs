//! Product option and option value models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};
use storefront_core::validation::validate_not_blank;
use storefront_core::variants::OptionValueLabel;
use validator::{Validate, ValidationError};

/// A row from the `product_options` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductOption {
    pub id: DbId,
    pub name: String,
    pub product_root_id: DbId,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
    #[sqlx(skip)]
    pub values: Vec<ProductOptionValue>,
}

/// A row from the `product_option_values` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ProductOptionValue {
    pub id: DbId,
    pub product_option_id: DbId,
    pub value: String,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
}

impl OptionValueLabel for ProductOptionValue {
    fn label(&self) -> &str {
        &self.value
    }
}

/// An option value joined through `product_variant_bridge` to a product.
#[derive(Debug, Clone, FromRow)]
pub struct BridgedOptionValue {
    pub product_id: DbId,
    #[sqlx(flatten)]
    pub value: ProductOptionValue,
}

fn validate_option_values(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ValidationError::new("blank_value")
            .with_message("option values must not be blank".into()));
    }
    // Values become lowercase SKU fragments, so `Red` and `red` collide.
    let mut seen = std::collections::HashSet::new();
    if let Some(duplicate) = values.iter().find(|v| !seen.insert(v.to_lowercase())) {
        return Err(ValidationError::new("duplicate_value")
            .with_message(format!("option value '{duplicate}' was provided more than once").into()));
    }
    Ok(())
}

/// An option and its values, as sent on root creation or
/// `POST /v1/product_root/{id}/options`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductOption {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_option_values"))]
    pub values: Vec<String>,
}

/// DTO for `PATCH /v1/product_options/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProductOption {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
}

/// DTO for creating or changing a single option value.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OptionValueInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub value: String,
}
