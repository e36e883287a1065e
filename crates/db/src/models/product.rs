//! Product (variant) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::types::{DbId, Timestamp};
use storefront_core::validation::{validate_not_blank, validate_sku};
use storefront_core::variants::VariantTemplate;
use validator::Validate;

use crate::models::image::ProductImageInput;
use crate::models::option::{CreateProductOption, ProductOptionValue};

/// Physical measurements shared by roots and products.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub product_weight: f64,
    pub product_height: f64,
    pub product_width: f64,
    pub product_length: f64,
    pub package_weight: f64,
    pub package_height: f64,
    pub package_width: f64,
    pub package_length: f64,
}

/// A product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub product_root_id: DbId,
    pub primary_image_id: Option<DbId>,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub option_summary: String,
    pub sku: String,
    pub upc: String,
    pub manufacturer: String,
    pub brand: String,
    pub quantity: i32,
    pub taxable: bool,
    pub price: f64,
    pub on_sale: bool,
    pub sale_price: f64,
    pub cost: f64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub dimensions: Dimensions,
    pub quantity_per_package: i32,
    pub available_on: Timestamp,
    pub created_on: Timestamp,
    pub updated_on: Option<Timestamp>,
    pub archived_on: Option<Timestamp>,
    /// Option values that produced this product. Loaded separately.
    #[sqlx(skip)]
    pub applicable_options: Vec<ProductOptionValue>,
}

/// Body of `POST /v1/product`: a product root, its options and images.
///
/// Every combination of option values becomes one product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    /// Becomes the root's SKU prefix.
    #[validate(custom(function = "validate_sku"))]
    pub sku: String,
    #[serde(default)]
    pub upc: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub quantity_per_package: i32,
    #[serde(default)]
    pub taxable: bool,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub sale_price: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(flatten)]
    pub dimensions: Dimensions,
    pub available_on: Option<Timestamp>,
    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<CreateProductOption>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ProductImageInput>,
}

impl CreateProduct {
    /// Apply creation defaults: at least one unit per package and
    /// availability starting `now` when unset.
    pub fn with_defaults(mut self, now: Timestamp) -> Self {
        self.quantity_per_package = self.quantity_per_package.max(1);
        self.available_on.get_or_insert(now);
        self
    }

    /// The base product every variant of the new root is cloned from.
    pub fn template(&self, product_root_id: DbId, available_on: Timestamp) -> NewProduct {
        NewProduct {
            product_root_id,
            name: self.name.clone(),
            subtitle: self.subtitle.clone(),
            description: self.description.clone(),
            option_summary: String::new(),
            sku: self.sku.clone(),
            upc: self.upc.clone(),
            manufacturer: self.manufacturer.clone(),
            brand: self.brand.clone(),
            quantity: self.quantity,
            taxable: self.taxable,
            price: self.price,
            on_sale: self.on_sale,
            sale_price: self.sale_price,
            cost: self.cost,
            dimensions: self.dimensions,
            quantity_per_package: self.quantity_per_package.max(1),
            available_on,
        }
    }
}

/// A product about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub product_root_id: DbId,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub option_summary: String,
    pub sku: String,
    pub upc: String,
    pub manufacturer: String,
    pub brand: String,
    pub quantity: i32,
    pub taxable: bool,
    pub price: f64,
    pub on_sale: bool,
    pub sale_price: f64,
    pub cost: f64,
    pub dimensions: Dimensions,
    pub quantity_per_package: i32,
    pub available_on: Timestamp,
}

impl VariantTemplate for NewProduct {
    fn base_sku(&self) -> &str {
        &self.sku
    }

    fn apply_variant(&mut self, sku: String, option_summary: String) {
        self.sku = sku;
        self.option_summary = option_summary;
    }
}

/// DTO for `PATCH /v1/product/{sku}`. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_sku"))]
    pub sku: Option<String>,
    pub upc: Option<String>,
    pub manufacturer: Option<String>,
    pub brand: Option<String>,
    pub quantity: Option<i32>,
    #[validate(range(min = 1))]
    pub quantity_per_package: Option<i32>,
    pub taxable: Option<bool>,
    pub price: Option<f64>,
    pub on_sale: Option<bool>,
    pub sale_price: Option<f64>,
    pub cost: Option<f64>,
    pub product_weight: Option<f64>,
    pub product_height: Option<f64>,
    pub product_width: Option<f64>,
    pub product_length: Option<f64>,
    pub package_weight: Option<f64>,
    pub package_height: Option<f64>,
    pub package_width: Option<f64>,
    pub package_length: Option<f64>,
    pub available_on: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn input(json: serde_json::Value) -> CreateProduct {
        serde_json::from_value(json).expect("valid creation body")
    }

    #[test]
    fn minimal_body_deserializes_with_defaults() {
        let body = input(serde_json::json!({"name": "Shirt", "sku": "shirt"}));
        assert!(body.validate().is_ok());
        assert!(body.options.is_empty());
        assert!(body.images.is_empty());
        assert_eq!(body.dimensions, Dimensions::default());

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let body = body.with_defaults(now);
        assert_eq!(body.quantity_per_package, 1);
        assert_eq!(body.available_on, Some(now));
    }

    #[test]
    fn explicit_values_survive_defaults() {
        let later = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let body = input(serde_json::json!({
            "name": "Shirt",
            "sku": "shirt",
            "quantity_per_package": 6,
            "product_weight": 1.5,
            "available_on": later,
        }))
        .with_defaults(Utc::now());
        assert_eq!(body.quantity_per_package, 6);
        assert_eq!(body.dimensions.product_weight, 1.5);
        assert_eq!(body.available_on, Some(later));
    }

    #[test]
    fn invalid_sku_and_nested_option_are_reported() {
        let body = input(serde_json::json!({
            "name": "Shirt",
            "sku": "shirt 2",
            "options": [{"name": " ", "values": ["red"]}],
        }));
        let message = storefront_core::validation::describe_errors(&body.validate().unwrap_err());
        assert!(message.contains("sku: the sku received (shirt 2) is invalid"));
        assert!(message.contains("options[0].name: must not be blank"));
    }

    #[test]
    fn template_carries_root_fields() {
        let now = Utc::now();
        let body = input(serde_json::json!({"name": "Mug", "sku": "mug", "price": 9.5}));
        let template = body.template(7, now);
        assert_eq!(template.product_root_id, 7);
        assert_eq!(template.base_sku(), "mug");
        assert_eq!(template.price, 9.5);
        assert_eq!(template.quantity_per_package, 1);
        assert!(template.option_summary.is_empty());
    }

    #[test]
    fn update_rejects_bad_sku() {
        let update = UpdateProduct {
            sku: Some("no spaces allowed".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(UpdateProduct::default().validate().is_ok());
    }
}
