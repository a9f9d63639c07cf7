//! Image probing for embedded media.
//!
//! Slide images arrive as opaque bytes. Before a picture is placed on a
//! slide we sniff its format, decode it once to make sure it is usable,
//! and record its pixel size for contain-fitting. The bytes themselves are
//! stored in the package untouched.

use thiserror::Error;

/// Image encodings a presentation reader accepts in `ppt/media/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Portable Network Graphics
    Png,

    /// JPEG
    Jpeg,

    /// GIF
    Gif,

    /// Windows bitmap
    Bmp,
}

impl ImageKind {
    /// Every supported kind
    pub const ALL: [ImageKind; 4] = [Self::Png, Self::Jpeg, Self::Gif, Self::Bmp];

    /// File extension used for the media part
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }

    /// MIME type registered in `[Content_Types].xml`
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }

    fn from_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// Why an image payload was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Zero-length payload
    #[error("image payload is empty")]
    Empty,

    /// Payload exceeds the configured ceiling
    #[error("image is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    /// Signature does not match any known image format
    #[error("unrecognized image format")]
    UnknownFormat,

    /// Known image format that presentations cannot embed
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Format recognised but the data does not decode
    #[error("image could not be decoded: {0}")]
    Decode(String),
}

/// An image that passed probing and can be embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Original encoded bytes
    pub data: Vec<u8>,

    /// Detected encoding
    pub kind: ImageKind,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl EmbeddedImage {
    /// Validate `bytes` and capture format and pixel size.
    ///
    /// `max_bytes` of `0` disables the size ceiling.
    pub fn probe(bytes: &[u8], max_bytes: usize) -> Result<Self, ProbeError> {
        if bytes.is_empty() {
            return Err(ProbeError::Empty);
        }
        if max_bytes > 0 && bytes.len() > max_bytes {
            return Err(ProbeError::TooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }

        let format =
            image::guess_format(bytes).map_err(|_| ProbeError::UnknownFormat)?;
        let kind = ImageKind::from_format(format)
            .ok_or_else(|| ProbeError::UnsupportedFormat(format!("{:?}", format)))?;

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ProbeError::Decode(e.to_string()))?;

        Ok(Self {
            data: bytes.to_vec(),
            kind,
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode a solid-colour PNG of the given size
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 80, 20]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_probe_png() {
        let bytes = png(40, 20);
        let image = EmbeddedImage::probe(&bytes, 0).unwrap();

        assert_eq!(image.kind, ImageKind::Png);
        assert_eq!((image.width, image.height), (40, 20));
        assert_eq!(image.data, bytes);
    }

    #[test]
    fn test_probe_rejects_empty() {
        assert_eq!(EmbeddedImage::probe(&[], 0), Err(ProbeError::Empty));
    }

    #[test]
    fn test_probe_rejects_garbage() {
        let err = EmbeddedImage::probe(b"definitely not an image", 0).unwrap_err();
        assert_eq!(err, ProbeError::UnknownFormat);
    }

    #[test]
    fn test_probe_rejects_truncated_png() {
        let bytes = png(16, 16);
        let truncated = &bytes[..bytes.len() / 2];

        let err = EmbeddedImage::probe(truncated, 0).unwrap_err();
        assert!(matches!(err, ProbeError::Decode(_)), "{:?}", err);
    }

    #[test]
    fn test_probe_enforces_ceiling() {
        let bytes = png(8, 8);
        let err = EmbeddedImage::probe(&bytes, 10).unwrap_err();
        assert!(matches!(err, ProbeError::TooLarge { limit: 10, .. }));
        assert!(err.to_string().contains("10 byte limit"));
    }

    #[test]
    fn test_kind_metadata() {
        for kind in ImageKind::ALL {
            assert!(kind.content_type().starts_with("image/"));
            assert!(!kind.extension().is_empty());
        }
        assert_eq!(ImageKind::Jpeg.extension(), "jpeg");
    }
}
