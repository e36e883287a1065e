//! Turning request image payloads into stored-ready renditions.
//!
//! Runs before the creation transaction opens so that slow downloads never
//! hold a database connection. Decoding and resizing run on the blocking
//! pool.

use std::str::FromStr;
use std::sync::Arc;

use storefront_core::images::{
    decode_base64_image, decode_image, ImageError, ImageSourceKind, ImageStorer, ThumbnailSet,
};
use storefront_db::catalog::ResolvedImage;
use storefront_db::models::image::ProductImageInput;

use crate::error::AppError;

/// Drop payloads whose `data` repeats an earlier one.
///
/// The surviving entry is primary if any of its duplicates asked to be.
pub fn dedupe_images(inputs: &[ProductImageInput]) -> Vec<ProductImageInput> {
    let mut unique: Vec<ProductImageInput> = Vec::with_capacity(inputs.len());
    for input in inputs {
        match unique.iter_mut().find(|seen| seen.data == input.data) {
            Some(seen) => seen.is_primary |= input.is_primary,
            None => unique.push(input.clone()),
        }
    }
    unique
}

enum Payload {
    Base64(String),
    Bytes(Vec<u8>),
}

/// Decode every image payload and build its renditions with `storer`,
/// downloading `url` payloads with `client`.
///
/// Images keep their (deduplicated) request order.
pub async fn resolve_images(
    client: &reqwest::Client,
    storer: Arc<dyn ImageStorer>,
    inputs: &[ProductImageInput],
) -> Result<Vec<ResolvedImage>, AppError> {
    let inputs = dedupe_images(inputs);
    let mut resolved = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.into_iter().enumerate() {
        let (payload, source_url) = match ImageSourceKind::from_str(&input.kind)? {
            ImageSourceKind::Base64 => (Payload::Base64(input.data), None),
            ImageSourceKind::Url => {
                let url = input.data.trim().to_string();
                let bytes = fetch_image(client, index, &url).await?;
                (Payload::Bytes(bytes), Some(url))
            }
        };
        let renditions = render(Arc::clone(&storer), index, payload).await?;
        resolved.push(ResolvedImage {
            renditions,
            source_url,
            is_primary: input.is_primary,
        });
    }

    Ok(resolved)
}

async fn render(
    storer: Arc<dyn ImageStorer>,
    index: usize,
    payload: Payload,
) -> Result<ThumbnailSet, ImageError> {
    tokio::task::spawn_blocking(move || {
        let image = match payload {
            Payload::Base64(data) => decode_base64_image(index, &data)?,
            Payload::Bytes(bytes) => decode_image(index, &bytes)?,
        };
        Ok::<_, ImageError>(storer.create_thumbnails(image))
    })
    .await
    .map_err(|e| ImageError::Task(e.to_string()))?
}

async fn fetch_image(client: &reqwest::Client, index: usize, url: &str) -> Result<Vec<u8>, AppError> {
    let response = client.get(url).send().await.map_err(|e| {
        tracing::warn!(index, url, error = %e, "Image download failed");
        AppError::BadRequest(format!("image at index {index} could not be downloaded from {url}"))
    })?;

    if !response.status().is_success() {
        return Err(AppError::BadRequest(format!(
            "image at index {index} could not be downloaded from {url}: HTTP {}",
            response.status().as_u16()
        )));
    }

    let bytes = response.bytes().await.map_err(|e| {
        tracing::warn!(index, url, error = %e, "Image download interrupted");
        AppError::BadRequest(format!("image at index {index} could not be downloaded from {url}"))
    })?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use base64::Engine as _;
    use image::{GenericImageView, ImageFormat, RgbImage};
    use storefront_core::images::{DynamicImage, ImageStorageProvider, MAIN_SIZE, THUMBNAIL_SIZE};

    fn storer() -> Arc<dyn ImageStorer> {
        ImageStorageProvider::Local.build(std::env::temp_dir(), "/product_images")
    }

    fn png_base64(width: u32, height: u32) -> String {
        let pixel = image::Rgb([1, 2, 3]);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, pixel));
        let mut buffer = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(buffer)
    }

    fn input(kind: &str, data: &str, is_primary: bool) -> ProductImageInput {
        ProductImageInput {
            kind: kind.into(),
            data: data.into(),
            is_primary,
        }
    }

    #[test]
    fn duplicates_collapse_and_keep_primary_flag() {
        let images = dedupe_images(&[
            input("base64", "AAA", false),
            input("base64", "BBB", false),
            input("base64", "AAA", true),
        ]);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].data, "AAA");
        assert!(images[0].is_primary);
        assert!(!images[1].is_primary);
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected() {
        let result =
            resolve_images(&reqwest::Client::new(), storer(), &[input("ftp", "x", false)]).await;
        assert_matches!(result, Err(AppError::Image(ImageError::UnknownSourceType(_))));
    }

    #[tokio::test]
    async fn bad_base64_is_rejected() {
        let result =
            resolve_images(&reqwest::Client::new(), storer(), &[input("base64", "%%%", false)])
                .await;
        assert_matches!(
            result,
            Err(AppError::Image(ImageError::InvalidBase64 { index: 0, .. }))
        );
    }

    #[tokio::test]
    async fn base64_payloads_arrive_rendered() {
        let data = png_base64(1200, 600);
        let resolved = resolve_images(
            &reqwest::Client::new(),
            storer(),
            &[input("base64", &data, true)],
        )
        .await
        .unwrap();

        assert_eq!(resolved.len(), 1);
        let renditions = &resolved[0].renditions;
        assert_eq!(renditions.original.dimensions(), (1200, 600));
        assert_eq!(renditions.main.width(), MAIN_SIZE);
        assert_eq!(renditions.thumbnail.width(), THUMBNAIL_SIZE);
        assert!(resolved[0].is_primary);
        assert!(resolved[0].source_url.is_none());
    }
}
