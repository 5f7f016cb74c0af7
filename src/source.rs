//! Where the image comes from: the bundled default, an upload, or a URL.

use std::fmt;

use image::DynamicImage;
use reqwest::Url;
use serde::Serialize;

use crate::error::{PaletteError, Result};

/// Path suffixes accepted for remote images (compared lowercase).
pub const ALLOWED_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

/// Image shown before the user picks one.
pub static DEFAULT_IMAGE: &[u8] = include_bytes!("../assets/default-palette.png");

/// A user's choice of image, before it has been loaded.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    Default,
    /// Raw file bytes; the decoder decides whether they are an image
    Upload(Vec<u8>),
    Url(String),
}

impl ImageSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ImageSource::Default => SourceKind::Default,
            ImageSource::Upload(_) => SourceKind::Upload,
            ImageSource::Url(url) => SourceKind::Url(url.trim().to_string()),
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Default => write!(f, "Default"),
            ImageSource::Upload(bytes) => write!(f, "Upload({} bytes)", bytes.len()),
            ImageSource::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

/// Label for a loaded source, cheap to clone into snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "lowercase")]
pub enum SourceKind {
    Default,
    Upload,
    Url(String),
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Default => write!(f, "(Default Image)"),
            SourceKind::Upload => write!(f, "(Uploaded Image)"),
            SourceKind::Url(url) => write!(f, "{url}"),
        }
    }
}

/// A decoded image together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub kind: SourceKind,
    pub image: DynamicImage,
}

/// Check that `raw` parses as a URL whose path ends in a known image
/// extension. Nothing is fetched.
pub fn validate_image_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let reject = |reason| PaletteError::InvalidUrl {
        url: trimmed.to_string(),
        reason,
    };
    if trimmed.is_empty() {
        return Err(reject("empty URL"));
    }
    let url = Url::parse(trimmed).map_err(|_| reject("not a well-formed URL"))?;
    let path = url.path().to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Err(reject("unsupported file extension"));
    }
    Ok(url)
}

/// Decode image bytes in any format the `image` crate recognises.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| PaletteError::image_load("unable to decode image", e))
}

pub fn default_image() -> Result<DynamicImage> {
    decode_image(DEFAULT_IMAGE)
}

#[cfg(not(target_arch = "wasm32"))]
impl ImageSource {
    /// Fetch (for URLs) and fully decode the image.
    ///
    /// The decode doubles as the pre-flight check: nothing is returned unless
    /// the bytes are a usable image.
    pub async fn resolve<F>(self, fetcher: &F) -> Result<LoadedImage>
    where
        F: crate::fetch::ImageFetcher + ?Sized,
    {
        let kind = self.kind();
        let image = match self {
            ImageSource::Default => default_image()?,
            ImageSource::Upload(bytes) => decode_image(&bytes)?,
            ImageSource::Url(raw) => {
                let url = validate_image_url(&raw)?;
                let bytes = fetcher.fetch(&url).await?;
                decode_image(&bytes)?
            }
        };
        tracing::info!(
            source = %kind,
            width = image.width(),
            height = image.height(),
            "Image source resolved"
        );
        Ok(LoadedImage { kind, image })
    }
}
