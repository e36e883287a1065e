//! Discount entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::error::CoreError;
use storefront_core::types::{DbId, Timestamp};
use storefront_core::validation::{validate_discount_type, validate_not_blank};
use validator::Validate;

/// A row from the `discounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Discount {
    pub id: DbId,
    pub name: String,
    pub discount_type: String,
    pub amount: f64,
    pub starts_on: Timestamp,
    pub expires_on: Option<Timestamp>,
    pub requires_code: bool,
    pub code: String,
    pub limited_use: bool,
    pub number_of_uses: i64,
    pub login_required: bool,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
}

/// DTO for `POST /v1/discount`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDiscount {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_discount_type"))]
    pub discount_type: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    /// Defaults to now.
    pub starts_on: Option<Timestamp>,
    pub expires_on: Option<Timestamp>,
    #[serde(default)]
    pub requires_code: bool,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub limited_use: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub number_of_uses: i64,
    #[serde(default)]
    pub login_required: bool,
}

/// DTO for `PATCH /v1/discount/{id}`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDiscount {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_discount_type"))]
    pub discount_type: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    pub starts_on: Option<Timestamp>,
    pub expires_on: Option<Timestamp>,
    pub requires_code: Option<bool>,
    pub code: Option<String>,
    pub limited_use: Option<bool>,
    #[validate(range(min = 0))]
    pub number_of_uses: Option<i64>,
    pub login_required: Option<bool>,
}

impl CreateDiscount {
    /// A code-gated discount needs a code, and the window must not be inverted.
    pub fn check_consistency(&self) -> Result<(), CoreError> {
        if self.requires_code && self.code.trim().is_empty() {
            return Err(CoreError::Validation(
                "a discount that requires a code must provide one".into(),
            ));
        }
        let starts_on = self.starts_on.unwrap_or_else(chrono::Utc::now);
        if let Some(expires_on) = self.expires_on {
            if expires_on <= starts_on {
                return Err(CoreError::Validation(
                    "discount must expire after it starts".into(),
                ));
            }
        }
        Ok(())
    }
}
