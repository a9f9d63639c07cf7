//! Export configuration.
//!
//! `ExportConfig` controls document metadata, typography and the image
//! size ceiling. It is loaded from TOML; every field has a default, so an
//! empty file is a valid configuration.

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Export settings shared by every deck written with them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Document metadata
    #[serde(default)]
    pub meta: MetaConfig,

    /// Fonts and spacing
    #[serde(default)]
    pub text: TextConfig,

    /// Embedded image limits
    #[serde(default)]
    pub images: ImageConfig,
}

/// Document-level metadata written to `docProps/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Author / creator
    #[serde(default = "default_author")]
    pub author: String,

    /// Company field of the extended properties
    #[serde(default = "default_company")]
    pub company: String,

    /// Language tag applied to text runs (e.g., "en-US")
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_author() -> String {
    "SlideGen AI".to_string()
}

fn default_company() -> String {
    "SlideGen AI User".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
            company: default_company(),
            locale: default_locale(),
        }
    }
}

/// Typography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Typeface for titles and bullets
    #[serde(default = "default_font_face")]
    pub font_face: String,

    /// Title size in points
    #[serde(default = "default_title_size")]
    pub title_size: u32,

    /// Bullet text size in points
    #[serde(default = "default_body_size")]
    pub body_size: u32,

    /// Distance between bullet lines in points
    #[serde(default = "default_line_spacing")]
    pub line_spacing: u32,
}

fn default_font_face() -> String {
    "Arial".to_string()
}

fn default_title_size() -> u32 {
    24
}

fn default_body_size() -> u32 {
    18
}

fn default_line_spacing() -> u32 {
    30
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font_face: default_font_face(),
            title_size: default_title_size(),
            body_size: default_body_size(),
            line_spacing: default_line_spacing(),
        }
    }
}

/// Image handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Largest accepted payload in bytes; 0 disables the limit
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

impl ExportConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        let config: ExportConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would produce an unreadable package
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("text.title_size", self.text.title_size),
            ("text.body_size", self.text.body_size),
            ("text.line_spacing", self.text.line_spacing),
        ];

        for (name, value) in sizes {
            if value == 0 || value > 400 {
                return Err(ExportError::config_error(format!(
                    "'{}' must be between 1 and 400 points, got {}",
                    name, value
                )));
            }
        }

        if self.text.font_face.trim().is_empty() {
            return Err(ExportError::config_error("'text.font_face' must not be empty"));
        }

        // BCP 47 tags only use letters, digits and hyphens
        let locale = &self.meta.locale;
        if locale.is_empty() || !locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ExportError::config_error(format!(
                "'meta.locale' must be a language tag such as \"en-US\", got {:?}",
                locale
            )));
        }

        Ok(())
    }
}
