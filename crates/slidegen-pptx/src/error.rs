//! Error types for deck export.

use std::fmt;
use thiserror::Error;

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Fatal errors that abort an export call.
///
/// Per-slide image problems are not fatal; they are reported as
/// [`AssetError`] values next to the produced package.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Theme identifier is not one of the registered themes
    #[error("Unknown theme '{id}' (expected one of: {expected})")]
    UnknownTheme { id: String, expected: String },

    /// The serializer was handed an empty slide list
    #[error("Cannot serialize an empty deck: at least one slide is required")]
    EmptyDeck,

    /// Export configuration could not be loaded or is inconsistent
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// The host refused the derived filename
    #[error("Invalid output filename '{filename}': {reason}")]
    InvalidFilename { filename: String, reason: String },

    /// A produced package could not be read back
    #[error("Invalid package: {reason}")]
    InvalidPackage { reason: String },

    /// XML generation or parsing error
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// ZIP archive error
    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error (for ExportConfig)
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl ExportError {
    /// Create an unknown theme error listing the valid identifiers
    pub fn unknown_theme(id: impl Into<String>) -> Self {
        let expected = crate::theme::ThemeId::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self::UnknownTheme {
            id: id.into(),
            expected,
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create an invalid filename error
    pub fn invalid_filename(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilename {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid package error
    pub fn invalid_package(reason: impl Into<String>) -> Self {
        Self::InvalidPackage {
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTheme { .. } => "SLD001",
            Self::EmptyDeck => "SLD002",
            Self::ConfigError { .. } => "SLD003",
            Self::InvalidFilename { .. } => "SLD004",
            Self::InvalidPackage { .. } => "SLD005",
            Self::XmlError(_) => "SLD006",
            Self::ZipError(_) => "SLD007",
            Self::IoError(_) => "SLD008",
            Self::TomlError(_) => "SLD009",
        }
    }

    /// Stage of the export pipeline that failed, for the UI failure signal
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnknownTheme { .. } | Self::ConfigError { .. } | Self::TomlError(_) => {
                "configuration"
            }
            Self::EmptyDeck => "input",
            Self::XmlError(_) | Self::ZipError(_) => "serialization",
            Self::InvalidFilename { .. } | Self::IoError(_) => "save",
            Self::InvalidPackage { .. } => "inspection",
        }
    }
}

/// Which image slot of a slide an asset error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    /// Content illustration shown next to the bullets
    Image,

    /// Full-bleed background picture
    Background,
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Background => f.write_str("background image"),
        }
    }
}

/// Recoverable failure to embed one slide's image.
///
/// The slide is still written; it falls back to the text-only layout
/// (or to the master background for a background image).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Slide {} ('{}'): {} skipped: {}", .slide_index + 1, .slide_id, .slot, .reason)]
pub struct AssetError {
    /// Zero-based position of the slide in the deck
    pub slide_index: usize,

    /// Identifier of the affected slide
    pub slide_id: String,

    /// Which image was dropped
    pub slot: ImageSlot,

    /// Why the image could not be embedded
    pub reason: String,
}
