//! Error types for palette extraction

use thiserror::Error;

/// Result type alias for palette operations
pub type Result<T> = std::result::Result<T, PaletteError>;

/// Everything that can stop one extraction attempt.
///
/// None of these are fatal: each one is local to a single attempt and the
/// caller decides whether to retry (new upload, new URL, or regenerate).
#[derive(Error, Debug)]
pub enum PaletteError {
    /// URL failed to parse or does not point at a supported image type
    #[error("Invalid image URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    /// Image bytes could not be fetched or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Sampler found no opaque pixels to cluster
    #[error("No colors could be extracted: image has no opaque pixels")]
    InsufficientSamples,

    /// Hex string is not `#RRGGBB`
    #[error("Invalid hex color: {value:?}")]
    InvalidHex { value: String },

    /// Extraction parameter outside the range the pipeline can run with
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Regenerate was requested before any image was loaded
    #[error("No image loaded")]
    NoImage,
}

impl PaletteError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadFailure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an image load error that has no underlying cause
    pub fn load_failed(message: impl Into<String>) -> Self {
        Self::ImageLoadFailure {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn invalid_parameter(parameter: &str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }

    /// Whether the current palette and source survive this error untouched.
    ///
    /// Only a bad configuration is a programming mistake; every other
    /// failure leaves the previous palette on screen.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PaletteError::InvalidParameter { .. })
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            PaletteError::InvalidUrl { .. } => {
                "Must be a valid image URL (e.g. ends with .jpg, .png, etc.).".to_string()
            }
            PaletteError::ImageLoadFailure { .. } => {
                "Invalid or inaccessible image. The previous palette is still shown.".to_string()
            }
            PaletteError::InsufficientSamples => {
                "Nothing extracted: the image is fully transparent.".to_string()
            }
            PaletteError::InvalidHex { value } => format!("{value} is not a #RRGGBB color."),
            PaletteError::NoImage => "Load an image first.".to_string(),
            PaletteError::InvalidParameter { .. } => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failures_keep_their_source() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err = PaletteError::image_load("decode failed", io);

        assert_eq!(err.to_string(), "Failed to load image: decode failed");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("truncated"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn invalid_parameters_are_not_recoverable() {
        let err = PaletteError::invalid_parameter("grid_size", 0);
        assert_eq!(err.to_string(), "Invalid parameter: grid_size = 0");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn user_messages_mention_the_cause() {
        let err = PaletteError::InvalidUrl {
            url: "https://example.com/photo.txt".into(),
            reason: "unsupported file extension",
        };
        assert!(err.user_message().contains("valid image URL"));
        assert!(PaletteError::InsufficientSamples
            .user_message()
            .contains("Nothing extracted"));
    }
}
