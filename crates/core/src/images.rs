//! Product image ingestion: decoding, thumbnailing and storage.
//!
//! Request payloads carry either raw base64 image data or a URL. Both end up
//! as a [`DynamicImage`] via [`decode_image`]. Fetching URLs is the caller's
//! job (it needs an HTTP client); everything else lives here.
//!
//! Storage is pluggable through [`ImageStorer`]. The only built-in backend is
//! [`LocalImageStorer`], which writes PNG renditions under a directory that
//! the API server also serves statically.

use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine as _;
use image::ImageFormat;

pub use image::DynamicImage;

/// Bounding box of the thumbnail rendition, in pixels.
pub const THUMBNAIL_SIZE: u32 = 100;

/// Bounding box of the main rendition, in pixels.
pub const MAIN_SIZE: u32 = 500;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image data at index {index} is not valid base64")]
    InvalidBase64 {
        index: usize,
        #[source]
        source: base64::DecodeError,
    },

    #[error("image data at index {index} is invalid: {source}")]
    Decode {
        index: usize,
        #[source]
        source: image::ImageError,
    },

    #[error("image at index {index} is {format}; only PNG and JPEG images are accepted")]
    UnsupportedFormat { index: usize, format: String },

    #[error("unknown image type '{0}'; expected 'base64' or 'url'")]
    UnknownSourceType(String),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("image storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image storage task failed: {0}")]
    Task(String),
}

impl ImageError {
    /// Whether the error was caused by the request payload rather than the
    /// server. Client errors map to 400, the rest to 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBase64 { .. }
                | Self::Decode { .. }
                | Self::UnsupportedFormat { .. }
                | Self::UnknownSourceType(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// How the `data` field of an image payload should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSourceKind {
    /// Raw base64 (not a `data:` URI).
    Base64,
    /// An http(s) URL to fetch.
    Url,
}

impl FromStr for ImageSourceKind {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "url" => Ok(Self::Url),
            other => Err(ImageError::UnknownSourceType(other.to_string())),
        }
    }
}

/// Decode image bytes, accepting PNG and JPEG only.
///
/// `index` is the position of the image in the request, used in messages.
pub fn decode_image(index: usize, bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let format =
        image::guess_format(bytes).map_err(|source| ImageError::Decode { index, source })?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(ImageError::UnsupportedFormat {
            index,
            format: format!("{format:?}").to_uppercase(),
        });
    }
    image::load_from_memory_with_format(bytes, format)
        .map_err(|source| ImageError::Decode { index, source })
}

/// Decode a raw base64 payload into an image.
pub fn decode_base64_image(index: usize, data: &str) -> Result<DynamicImage, ImageError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|source| ImageError::InvalidBase64 { index, source })?;
    decode_image(index, &bytes)
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// The three renditions stored for every product image.
#[derive(Debug, Clone)]
pub struct ThumbnailSet {
    pub thumbnail: DynamicImage,
    pub main: DynamicImage,
    pub original: DynamicImage,
}

/// Public URLs of a stored [`ThumbnailSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLocations {
    pub thumbnail: String,
    pub main: String,
    pub original: String,
}

/// Backend that persists product image renditions.
#[async_trait::async_trait]
pub trait ImageStorer: Send + Sync {
    /// Produce the renditions for one image. Aspect ratio is preserved and
    /// images already inside a bounding box are never upscaled.
    fn create_thumbnails(&self, image: DynamicImage) -> ThumbnailSet {
        ThumbnailSet {
            thumbnail: shrink_to_fit(&image, THUMBNAIL_SIZE),
            main: shrink_to_fit(&image, MAIN_SIZE),
            original: image,
        }
    }

    /// Store the renditions of the `index`-th image of the root `sku`.
    async fn store_images(
        &self,
        set: ThumbnailSet,
        sku: &str,
        index: usize,
    ) -> Result<ImageLocations, ImageError>;
}

fn shrink_to_fit(image: &DynamicImage, size: u32) -> DynamicImage {
    if image.width() <= size && image.height() <= size {
        image.clone()
    } else {
        image.thumbnail(size, size)
    }
}

/// Which [`ImageStorer`] the server runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStorageProvider {
    Local,
}

impl FromStr for ImageStorageProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            other => Err(format!("unknown image storage provider '{other}'")),
        }
    }
}

impl fmt::Display for ImageStorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
        }
    }
}

impl ImageStorageProvider {
    /// Build the storer for this provider.
    pub fn build(self, directory: impl Into<PathBuf>, url_prefix: &str) -> Arc<dyn ImageStorer> {
        match self {
            Self::Local => Arc::new(LocalImageStorer::new(directory, url_prefix)),
        }
    }
}

/// Writes renditions as PNG files to `{directory}/{sku}/{index}/`.
#[derive(Debug, Clone)]
pub struct LocalImageStorer {
    directory: PathBuf,
    url_prefix: String,
}

impl LocalImageStorer {
    /// `url_prefix` is the path the directory is served under, e.g.
    /// `/product_images`.
    pub fn new(directory: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            directory: directory.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(ImageError::Encode)?;
        Ok(buffer)
    }
}

#[async_trait::async_trait]
impl ImageStorer for LocalImageStorer {
    async fn store_images(
        &self,
        set: ThumbnailSet,
        sku: &str,
        index: usize,
    ) -> Result<ImageLocations, ImageError> {
        let relative = format!("{sku}/{index}");
        let target = self.directory.join(&relative);
        tokio::fs::create_dir_all(&target).await?;

        let encoded = tokio::task::spawn_blocking(move || {
            Ok::<_, ImageError>([
                ("thumbnail.png", Self::encode_png(&set.thumbnail)?),
                ("main.png", Self::encode_png(&set.main)?),
                ("original.png", Self::encode_png(&set.original)?),
            ])
        })
        .await
        .map_err(|e| ImageError::Task(e.to_string()))??;

        for (file_name, bytes) in &encoded {
            tokio::fs::write(target.join(file_name), bytes).await?;
        }

        tracing::debug!(sku, index, path = %target.display(), "Stored product image renditions");

        let url = |file_name: &str| format!("{}/{relative}/{file_name}", self.url_prefix);
        Ok(ImageLocations {
            thumbnail: url("thumbnail.png"),
            main: url("main.png"),
            original: url("original.png"),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use image::{GenericImageView, RgbImage};

    use super::*;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 30, 30]),
        ));
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), format)
            .expect("encode test image");
        buffer
    }

    #[test]
    fn decodes_png_and_jpeg() {
        let png = decode_image(0, &encoded(20, 10, ImageFormat::Png)).unwrap();
        assert_eq!(png.dimensions(), (20, 10));
        let jpeg = decode_image(1, &encoded(16, 16, ImageFormat::Jpeg)).unwrap();
        assert_eq!(jpeg.dimensions(), (16, 16));
    }

    #[test]
    fn decodes_base64_payload() {
        let data = base64::engine::general_purpose::STANDARD.encode(encoded(8, 8, ImageFormat::Png));
        let image = decode_base64_image(0, &data).unwrap();
        assert_eq!(image.dimensions(), (8, 8));
    }

    #[test]
    fn rejects_bad_base64() {
        let err = decode_base64_image(3, "not base64 at all!").unwrap_err();
        assert_matches!(err, ImageError::InvalidBase64 { index: 3, .. });
        assert!(err.is_client_error());
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = decode_image(2, b"definitely not an image").unwrap_err();
        assert_matches!(err, ImageError::Decode { index: 2, .. });
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn rejects_other_formats() {
        let err = decode_image(0, b"GIF89a\x01\x00\x01\x00\x00\x00\x00;").unwrap_err();
        assert_matches!(err, ImageError::UnsupportedFormat { index: 0, .. });
    }

    #[test]
    fn source_kind_is_case_insensitive() {
        assert_eq!("BASE64".parse::<ImageSourceKind>().unwrap(), ImageSourceKind::Base64);
        assert_eq!("url".parse::<ImageSourceKind>().unwrap(), ImageSourceKind::Url);
        assert_matches!(
            "ftp".parse::<ImageSourceKind>(),
            Err(ImageError::UnknownSourceType(kind)) if kind == "ftp"
        );
    }

    #[test]
    fn storage_provider_parses_local_only() {
        assert_eq!(
            "Local".parse::<ImageStorageProvider>().unwrap(),
            ImageStorageProvider::Local
        );
        assert!("s3".parse::<ImageStorageProvider>().is_err());
        assert_eq!(ImageStorageProvider::Local.to_string(), "local");
    }

    #[test]
    fn thumbnails_fit_their_bounding_boxes() {
        let storer = LocalImageStorer::new("unused", "/product_images");
        let source = decode_image(0, &encoded(800, 400, ImageFormat::Png)).unwrap();
        let set = storer.create_thumbnails(source);
        assert_eq!(set.thumbnail.dimensions(), (100, 50));
        assert_eq!(set.main.dimensions(), (500, 250));
        assert_eq!(set.original.dimensions(), (800, 400));
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let storer = LocalImageStorer::new("unused", "/product_images");
        let source = decode_image(0, &encoded(60, 30, ImageFormat::Png)).unwrap();
        let set = storer.create_thumbnails(source);
        assert_eq!(set.thumbnail.dimensions(), (60, 30));
        assert_eq!(set.main.dimensions(), (60, 30));
    }

    #[tokio::test]
    async fn local_storer_writes_three_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let storer = LocalImageStorer::new(dir.path(), "/product_images/");
        let source = decode_image(0, &encoded(40, 40, ImageFormat::Jpeg)).unwrap();
        let set = storer.create_thumbnails(source);

        let locations = storer.store_images(set, "shirt", 1).await.unwrap();

        assert_eq!(locations.thumbnail, "/product_images/shirt/1/thumbnail.png");
        assert_eq!(locations.main, "/product_images/shirt/1/main.png");
        assert_eq!(locations.original, "/product_images/shirt/1/original.png");
        for name in ["thumbnail.png", "main.png", "original.png"] {
            let bytes = std::fs::read(dir.path().join("shirt/1").join(name)).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        }
    }
}
