//! # slidegen-pptx
//!
//! Export of themed slide decks to PowerPoint (PPTX) packages.
//!
//! The export core is a pure function of a deck snapshot: an ordered list of
//! [`Slide`]s, a theme identifier and a title. It keeps no state between
//! calls.
//!
//! ## Features
//!
//! - **Theme Registry**: five fixed palettes, looked up by identifier
//! - **Conditional Layout**: full-width bullets, or bullets beside a contain-fitted image
//! - **Speaker Notes**: written to notes slides, never onto the slide surface
//! - **Transitions**: fade, push, wipe, cover and uncover per slide
//! - **Recoverable Assets**: an undecodable image drops that image only, and is reported
//!
//! ## Example
//!
//! ```rust,no_run
//! use slidegen_pptx::{DirectoryTarget, Exporter, ExportConfig, Slide};
//!
//! let slides = vec![
//!     Slide::new("Quarterly Review").with_bullets(["Revenue up", "Costs flat"]),
//! ];
//!
//! let exporter = Exporter::new(ExportConfig::default());
//! let mut target = DirectoryTarget::new("out");
//! if let Some(report) = exporter.export(&slides, "WARM_ORANGE", "Q3 Review", &mut target)? {
//!     println!("wrote {} ({} bytes)", report.filename, report.size);
//! }
//! # Ok::<(), slidegen_pptx::ExportError>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod inspect;
pub mod layout;
pub mod media;
pub mod slide;
pub mod theme;
pub mod writer;

// Re-exports
pub use config::ExportConfig;
pub use error::{AssetError, ExportError, ImageSlot, Result};
pub use export::{
    derive_filename, export_presentation, DirectoryTarget, ExportReport, Exporter,
    MemoryTarget, SaveTarget, PPTX_CONTENT_TYPE,
};
pub use inspect::{PackageSummary, SlideSummary};
pub use layout::{Rect, SlideLayout};
pub use media::{EmbeddedImage, ImageKind, ProbeError};
pub use slide::{ImageData, Slide, SlideTransition};
pub use theme::{resolve_theme, Theme, ThemeId};
pub use writer::{ExportedDeck, PptxWriter};

/// PPTX-related constants
pub mod constants {
    /// Slide width in EMU (10in)
    pub const SLIDE_WIDTH_EMU: i64 = 9_144_000;

    /// Slide height in EMU (5.625in, 16:9)
    pub const SLIDE_HEIGHT_EMU: i64 = 5_143_500;

    /// Notes page width in EMU (7.5in portrait)
    pub const NOTES_WIDTH_EMU: i64 = 6_858_000;

    /// Notes page height in EMU (10in)
    pub const NOTES_HEIGHT_EMU: i64 = 9_144_000;

    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// Application name written to the extended properties
    pub const APPLICATION_NAME: &str = "SlideGen AI";

    /// Shape names. The package reader relies on these.
    pub const HEADER_BAR_NAME: &str = "Header Bar";
    pub const TITLE_SHAPE_NAME: &str = "Title 1";
    pub const BODY_SHAPE_NAME: &str = "Bullets 2";
    pub const PICTURE_SHAPE_NAME: &str = "Image 3";

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Relationships namespace
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Package relationships namespace (`.rels` parts)
    pub const NS_PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";

    /// Slide relationship type
    pub const REL_TYPE_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Slide layout relationship type
    pub const REL_TYPE_SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    /// Slide master relationship type
    pub const REL_TYPE_SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// Notes slide relationship type
    pub const REL_TYPE_NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

    /// Notes master relationship type
    pub const REL_TYPE_NOTES_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";

    /// Theme relationship type
    pub const REL_TYPE_THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

    /// Image relationship type
    pub const REL_TYPE_IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

    /// Presentation properties relationship type
    pub const REL_TYPE_PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";

    /// View properties relationship type
    pub const REL_TYPE_VIEW_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";

    /// Table styles relationship type
    pub const REL_TYPE_TABLE_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_constants() {
        assert_eq!(constants::EMU_PER_INCH, 914_400);
        assert_eq!(constants::NOTES_HEIGHT_EMU, 10 * constants::EMU_PER_INCH);
    }

    #[test]
    fn test_slide_is_sixteen_by_nine() {
        assert_eq!(constants::SLIDE_WIDTH_EMU, 10 * constants::EMU_PER_INCH);
        assert_eq!(
            constants::SLIDE_WIDTH_EMU * 9,
            constants::SLIDE_HEIGHT_EMU * 16
        );
    }
}
