//! Transactional product-root creation.
//!
//! [`create_product_root`] writes a root, its images, options and values,
//! expands the options into products with
//! [`build_variants`](storefront_core::variants::build_variants), persists
//! every product with its bridge rows and finally picks the primary image.
//!
//! All writes go through a [`CatalogWriter`], implemented for
//! [`PgConnection`] so callers pass `&mut *tx`. Nothing here commits: on any
//! error the caller drops the transaction and every row written so far is
//! rolled back.

use async_trait::async_trait;
use sqlx::PgConnection;
use storefront_core::error::CoreError;
use storefront_core::images::{ImageError, ImageStorer, ThumbnailSet};
use storefront_core::types::{DbId, Timestamp};
use storefront_core::variants::{build_variants, ensure_variant_limit, Variant};

use crate::models::image::{NewProductImage, ProductImage};
use crate::models::option::{ProductOption, ProductOptionValue};
use crate::models::product::{CreateProduct, NewProduct, Product};
use crate::models::product_root::{ProductRoot, ProductRootDetail};
use crate::repositories::{
    ProductImageRepo, ProductOptionRepo, ProductOptionValueRepo, ProductRepo, ProductRootRepo,
    VariantBridgeRepo,
};

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Transaction-scoped writes needed to create a product root.
#[async_trait]
pub trait CatalogWriter: Send {
    async fn create_product_root(
        &mut self,
        input: &CreateProduct,
        available_on: Timestamp,
    ) -> Result<ProductRoot, sqlx::Error>;

    async fn create_product_image(
        &mut self,
        image: &NewProductImage,
    ) -> Result<ProductImage, sqlx::Error>;

    async fn create_option(
        &mut self,
        product_root_id: DbId,
        name: &str,
    ) -> Result<ProductOption, sqlx::Error>;

    async fn create_option_value(
        &mut self,
        product_option_id: DbId,
        value: &str,
    ) -> Result<ProductOptionValue, sqlx::Error>;

    async fn create_product(&mut self, product: &NewProduct) -> Result<Product, sqlx::Error>;

    async fn create_variant_bridges(
        &mut self,
        product_id: DbId,
        option_value_ids: &[DbId],
    ) -> Result<(), sqlx::Error>;

    async fn set_root_primary_image(
        &mut self,
        product_root_id: DbId,
        image_id: DbId,
    ) -> Result<(), sqlx::Error>;

    async fn set_product_primary_image(
        &mut self,
        product_id: DbId,
        image_id: DbId,
    ) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl CatalogWriter for PgConnection {
    async fn create_product_root(
        &mut self,
        input: &CreateProduct,
        available_on: Timestamp,
    ) -> Result<ProductRoot, sqlx::Error> {
        ProductRootRepo::create(self, input, available_on).await
    }

    async fn create_product_image(
        &mut self,
        image: &NewProductImage,
    ) -> Result<ProductImage, sqlx::Error> {
        ProductImageRepo::create(self, image).await
    }

    async fn create_option(
        &mut self,
        product_root_id: DbId,
        name: &str,
    ) -> Result<ProductOption, sqlx::Error> {
        ProductOptionRepo::create(self, product_root_id, name).await
    }

    async fn create_option_value(
        &mut self,
        product_option_id: DbId,
        value: &str,
    ) -> Result<ProductOptionValue, sqlx::Error> {
        ProductOptionValueRepo::create(self, product_option_id, value).await
    }

    async fn create_product(&mut self, product: &NewProduct) -> Result<Product, sqlx::Error> {
        ProductRepo::create(self, product).await
    }

    async fn create_variant_bridges(
        &mut self,
        product_id: DbId,
        option_value_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        VariantBridgeRepo::create_many(self, product_id, option_value_ids).await?;
        Ok(())
    }

    async fn set_root_primary_image(
        &mut self,
        product_root_id: DbId,
        image_id: DbId,
    ) -> Result<(), sqlx::Error> {
        ProductRootRepo::set_primary_image(self, product_root_id, image_id).await
    }

    async fn set_product_primary_image(
        &mut self,
        product_id: DbId,
        image_id: DbId,
    ) -> Result<(), sqlx::Error> {
        ProductRepo::set_primary_image(self, product_id, image_id).await
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// A request image already decoded and rendered, ready to be stored.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub renditions: ThumbnailSet,
    /// Set when the image was fetched from a URL.
    pub source_url: Option<String>,
    pub is_primary: bool,
}

/// Create a root with everything it owns inside the caller's transaction.
///
/// `input` must already carry its creation defaults
/// ([`CreateProduct::with_defaults`]). Option sets that would expand past
/// [`MAX_VARIANTS`](storefront_core::variants::MAX_VARIANTS) are rejected
/// before anything is written.
pub async fn create_product_root<W>(
    writer: &mut W,
    storer: &dyn ImageStorer,
    input: &CreateProduct,
    images: Vec<ResolvedImage>,
) -> Result<ProductRootDetail, CatalogError>
where
    W: CatalogWriter + ?Sized,
{
    ensure_variant_limit(input.options.iter().map(|option| option.values.len()))?;

    let available_on = input.available_on.unwrap_or_else(chrono::Utc::now);
    let mut root = writer.create_product_root(input, available_on).await?;

    let mut created_images = Vec::with_capacity(images.len());
    let mut flagged_primary = None;
    for (index, resolved) in images.into_iter().enumerate() {
        let locations = storer
            .store_images(resolved.renditions, &root.sku_prefix, index)
            .await?;
        let image = writer
            .create_product_image(&NewProductImage {
                product_root_id: root.id,
                thumbnail_url: locations.thumbnail,
                main_url: locations.main,
                original_url: locations.original,
                source_url: resolved.source_url.unwrap_or_default(),
            })
            .await?;
        if resolved.is_primary && flagged_primary.is_none() {
            flagged_primary = Some(image.id);
        }
        created_images.push(image);
    }

    let mut options = Vec::with_capacity(input.options.len());
    for option_input in &input.options {
        let mut option = writer.create_option(root.id, &option_input.name).await?;
        for value in &option_input.values {
            let value = writer.create_option_value(option.id, value).await?;
            option.values.push(value);
        }
        options.push(option);
    }

    let template = input.template(root.id, available_on);
    let variants = build_variants(
        &template,
        options
            .iter()
            .map(|option| (option.name.as_str(), option.values.as_slice())),
    )?;
    let mut products = persist_variants(writer, variants).await?;

    let primary_image_id = flagged_primary.or_else(|| created_images.first().map(|i| i.id));
    if let Some(image_id) = primary_image_id {
        writer.set_root_primary_image(root.id, image_id).await?;
        root.primary_image_id = Some(image_id);
        if let Some(first) = products.first_mut() {
            writer.set_product_primary_image(first.id, image_id).await?;
            first.primary_image_id = Some(image_id);
        }
    }

    tracing::debug!(
        product_root_id = root.id,
        sku_prefix = %root.sku_prefix,
        option_count = options.len(),
        product_count = products.len(),
        image_count = created_images.len(),
        "Product root written"
    );

    Ok(ProductRootDetail {
        root,
        options,
        images: created_images,
        products,
    })
}

/// Persist materialized variants and their bridge rows, in order.
///
/// Stops at the first failure; the caller's transaction discards whatever
/// was already written.
pub async fn persist_variants<W>(
    writer: &mut W,
    variants: Vec<Variant<NewProduct, ProductOptionValue>>,
) -> Result<Vec<Product>, sqlx::Error>
where
    W: CatalogWriter + ?Sized,
{
    let mut products = Vec::with_capacity(variants.len());
    for variant in variants {
        let mut product = writer.create_product(&variant.product).await?;
        let value_ids: Vec<DbId> = variant.option_values.iter().map(|v| v.id).collect();
        writer.create_variant_bridges(product.id, &value_ids).await?;
        product.applicable_options = variant.option_values;
        products.push(product);
    }
    Ok(products)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
