//! Slide geometry and layout selection.
//!
//! All positions are in EMU on a 16:9 canvas of 10in x 5.625in. Every
//! slide gets one of two layouts, chosen once from whether its image
//! could be embedded.

use crate::constants::{EMU_PER_INCH, SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU};
use crate::media::EmbeddedImage;
use serde::Serialize;

/// Axis-aligned box in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    /// Left edge
    pub x: i64,

    /// Top edge
    pub y: i64,

    /// Width
    pub cx: i64,

    /// Height
    pub cy: i64,
}

impl Rect {
    /// Box from EMU values
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Box from inch values
    pub fn from_inches(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(inches(x), inches(y), inches(w), inches(h))
    }

    /// Right edge
    pub fn right(&self) -> i64 {
        self.x + self.cx
    }

    /// Bottom edge
    pub fn bottom(&self) -> i64 {
        self.y + self.cy
    }

    /// Whether `other` lies entirely inside this box
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// `<a:xfrm>` element for this box
    pub fn to_xfrm(&self) -> String {
        format!(
            "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>",
            self.x, self.y, self.cx, self.cy
        )
    }
}

fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

fn percent_of_width(pct: i64) -> i64 {
    SLIDE_WIDTH_EMU * pct / 100
}

/// Thin bar across the top of every slide, drawn by the master
pub fn header_bar() -> Rect {
    Rect::new(0, 0, SLIDE_WIDTH_EMU, inches(0.75))
}

/// Title text box, just below the header bar
pub fn title_box() -> Rect {
    Rect::new(inches(0.5), inches(0.85), percent_of_width(90), inches(0.6))
}

/// Full-width bullet region for text-only slides
pub fn full_body_box() -> Rect {
    Rect::new(inches(0.5), inches(1.55), percent_of_width(90), inches(3.8))
}

/// Left bullet column for slides with an image
pub fn narrow_body_box() -> Rect {
    Rect::new(inches(0.5), inches(1.55), percent_of_width(45), inches(3.8))
}

/// Bounding box the content image must fit inside
pub fn image_bounds() -> Rect {
    Rect::from_inches(5.2, 1.55, 4.5, 3.8)
}

/// The whole slide
pub fn canvas() -> Rect {
    Rect::new(0, 0, SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU)
}

/// Scale an image of `width` x `height` pixels to fit inside `bounds`.
///
/// Aspect ratio is preserved, nothing is cropped, and the result is centred
/// in `bounds` without exceeding it in either dimension.
pub fn contain(bounds: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return bounds;
    }

    let (width, height) = (i64::from(width), i64::from(height));

    // Integer math so the constrained side lands exactly on the bound
    let (cx, cy) = if width * bounds.cy >= height * bounds.cx {
        (bounds.cx, (bounds.cx * height / width).max(1))
    } else {
        ((bounds.cy * width / height).max(1), bounds.cy)
    };

    Rect::new(
        bounds.x + (bounds.cx - cx) / 2,
        bounds.y + (bounds.cy - cy) / 2,
        cx,
        cy,
    )
}

/// Layout of one slide's content region
#[derive(Debug, Clone)]
pub enum SlideLayout {
    /// Bullets across the full width
    TextOnly,

    /// Bullets on the left, picture on the right
    TextWithImage(EmbeddedImage),
}

impl SlideLayout {
    /// Pick the layout from an already-probed image
    pub fn select(image: Option<EmbeddedImage>) -> Self {
        match image {
            Some(image) => Self::TextWithImage(image),
            None => Self::TextOnly,
        }
    }

    /// Bullet region for this layout
    pub fn body_box(&self) -> Rect {
        match self {
            Self::TextOnly => full_body_box(),
            Self::TextWithImage(_) => narrow_body_box(),
        }
    }

    /// Placed picture, if any
    pub fn picture(&self) -> Option<(&EmbeddedImage, Rect)> {
        match self {
            Self::TextOnly => None,
            Self::TextWithImage(image) => {
                Some((image, contain(image_bounds(), image.width, image.height)))
            }
        }
    }

    /// 1-based index of the matching `slideLayoutN.xml`
    pub fn layout_index(&self) -> u32 {
        match self {
            Self::TextOnly => 1,
            Self::TextWithImage(_) => 2,
        }
    }

    /// Name of the matching slide layout part
    pub fn name(&self) -> &'static str {
        match self {
            Self::TextOnly => LAYOUT_NAMES[0],
            Self::TextWithImage(_) => LAYOUT_NAMES[1],
        }
    }
}

/// Slide layout part names, by index - 1
pub const LAYOUT_NAMES: [&str; 2] = ["Text Only", "Text With Image"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ImageKind;

    fn sample_image(width: u32, height: u32) -> EmbeddedImage {
        EmbeddedImage {
            data: vec![0u8; 4],
            kind: ImageKind::Png,
            width,
            height,
        }
    }

    #[test]
    fn test_regions_fit_on_canvas() {
        let canvas = canvas();
        for rect in [
            header_bar(),
            title_box(),
            full_body_box(),
            narrow_body_box(),
            image_bounds(),
        ] {
            assert!(canvas.contains(&rect), "{:?} outside canvas", rect);
        }
    }

    #[test]
    fn test_title_sits_below_header_bar() {
        assert!(title_box().y >= header_bar().bottom());
        assert!(full_body_box().y >= title_box().bottom());
    }

    #[test]
    fn test_two_column_regions_do_not_overlap() {
        assert!(narrow_body_box().right() <= image_bounds().x);
        assert!(full_body_box().cx > narrow_body_box().cx);
    }

    #[test]
    fn test_contain_wide_image() {
        let bounds = image_bounds();
        let placed = contain(bounds, 1600, 400);

        assert!(bounds.contains(&placed));
        assert_eq!(placed.cx, bounds.cx);
        // 4:1 aspect ratio survives, within a rounding step
        assert!((placed.cx - placed.cy * 4).abs() <= 4);
        // vertically centred
        assert_eq!(placed.y - bounds.y, (bounds.cy - placed.cy) / 2);
    }

    #[test]
    fn test_contain_tall_image() {
        let bounds = image_bounds();
        let placed = contain(bounds, 300, 900);

        assert!(bounds.contains(&placed));
        assert_eq!(placed.cy, bounds.cy);
        assert!((placed.cy - placed.cx * 3).abs() <= 3);
    }

    #[test]
    fn test_contain_upscales_small_image() {
        let bounds = image_bounds();
        let placed = contain(bounds, 2, 2);

        assert!(bounds.contains(&placed));
        assert_eq!(placed.cx, placed.cy);
        assert_eq!(placed.cy, bounds.cy);
    }

    #[test]
    fn test_contain_degenerate_dimensions() {
        let bounds = image_bounds();
        assert_eq!(contain(bounds, 0, 10), bounds);
    }

    #[test]
    fn test_layout_selection() {
        let text = SlideLayout::select(None);
        assert!(matches!(text, SlideLayout::TextOnly));
        assert_eq!(text.body_box(), full_body_box());
        assert!(text.picture().is_none());
        assert_eq!(text.layout_index(), 1);

        let split = SlideLayout::select(Some(sample_image(800, 600)));
        assert_eq!(split.body_box(), narrow_body_box());
        assert_eq!(split.layout_index(), 2);
        assert_eq!(split.name(), "Text With Image");
        let (_, placed) = split.picture().unwrap();
        assert!(image_bounds().contains(&placed));
    }
}
