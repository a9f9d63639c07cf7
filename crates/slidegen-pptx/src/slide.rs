//! Slide data structures.
//!
//! This is the snapshot the editing UI hands over at export time. The
//! export core only reads it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single slide in a deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Stable identifier, unique within a deck
    pub id: String,

    /// Slide heading (may be empty)
    #[serde(default)]
    pub title: String,

    /// Bullet lines in presentation order
    #[serde(default)]
    pub bullets: Vec<String>,

    /// Presenter notes, never drawn on the slide
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_notes: Option<String>,

    /// Content illustration shown to the right of the bullets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,

    /// Full-bleed picture behind all slide content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ImageData>,

    /// How this slide is revealed; `None` means fade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<SlideTransition>,
}

impl Slide {
    /// Create a slide with a fresh identifier
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), title)
    }

    /// Create a slide with an explicit identifier
    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            bullets: Vec::new(),
            speaker_notes: None,
            image: None,
            background_image: None,
            transition: None,
        }
    }

    /// Append a bullet line
    pub fn with_bullet(mut self, bullet: impl Into<String>) -> Self {
        self.bullets.push(bullet.into());
        self
    }

    /// Append several bullet lines
    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets.extend(bullets.into_iter().map(Into::into));
        self
    }

    /// Set speaker notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.speaker_notes = Some(notes.into());
        self
    }

    /// Attach a content image
    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }

    /// Attach a background image
    pub fn with_background(mut self, image: ImageData) -> Self {
        self.background_image = Some(image);
        self
    }

    /// Set the transition
    pub fn with_transition(mut self, transition: SlideTransition) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Content image bytes, treating an empty payload as absent
    pub fn image_bytes(&self) -> Option<&[u8]> {
        self.image.as_ref().filter(|i| !i.is_empty()).map(ImageData::as_bytes)
    }

    /// Background image bytes, treating an empty payload as absent
    pub fn background_bytes(&self) -> Option<&[u8]> {
        self.background_image
            .as_ref()
            .filter(|i| !i.is_empty())
            .map(ImageData::as_bytes)
    }

    /// Speaker notes, treating whitespace-only text as absent
    pub fn notes(&self) -> Option<&str> {
        self.speaker_notes
            .as_deref()
            .filter(|n| !n.trim().is_empty())
    }

    /// Effective transition (fade when unset)
    pub fn effective_transition(&self) -> SlideTransition {
        self.transition.unwrap_or_default()
    }
}

/// Visual effect used when advancing into a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideTransition {
    /// Instant change
    None,

    /// Cross-fade
    #[default]
    Fade,

    /// New slide pushes the old one off
    Push,

    /// Wipe across
    Wipe,

    /// New slide slides over the old one
    Cover,

    /// Old slide slides away, revealing the new one
    Uncover,
}

impl SlideTransition {
    /// All supported transitions
    pub const ALL: [SlideTransition; 6] = [
        Self::None,
        Self::Fade,
        Self::Push,
        Self::Wipe,
        Self::Cover,
        Self::Uncover,
    ];

    /// Identifier as used in deck files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fade => "fade",
            Self::Push => "push",
            Self::Wipe => "wipe",
            Self::Cover => "cover",
            Self::Uncover => "uncover",
        }
    }

    /// PresentationML element for this effect, or `None` for no transition.
    ///
    /// "Uncover" is `p:pull` in the file format.
    pub fn ooxml_element(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Fade => Some("fade"),
            Self::Push => Some("push"),
            Self::Wipe => Some("wipe"),
            Self::Cover => Some("cover"),
            Self::Uncover => Some("pull"),
        }
    }

    /// Inverse of [`ooxml_element`](Self::ooxml_element)
    pub fn from_ooxml_element(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.ooxml_element() == Some(name))
    }

    /// Full `<p:transition>` element, empty for [`SlideTransition::None`]
    pub fn to_xml(&self) -> String {
        match self.ooxml_element() {
            Some(effect) => format!(
                "  <p:transition spd=\"med\"><p:{}/></p:transition>\n",
                effect
            ),
            None => String::new(),
        }
    }
}

impl fmt::Display for SlideTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-contained image payload.
///
/// Holds raw encoded bytes (PNG, JPEG, ...). In deck files it is written as a
/// `data:` URL; a bare base64 string is accepted on input.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ImageData(Vec<u8>);

impl ImageData {
    /// Wrap raw image bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a `data:<mime>;base64,<payload>` URL or a bare base64 string
    pub fn from_data_url(value: &str) -> Result<Self, base64::DecodeError> {
        let payload = match value.split_once(";base64,") {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => value,
        };
        // Payloads pasted from editors are often wrapped
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact).map(Self)
    }

    /// Encode as a `data:` URL
    pub fn to_data_url(&self) -> String {
        let mime = match image::guess_format(&self.0) {
            Ok(format) => format.to_mime_type(),
            Err(_) => "application/octet-stream",
        };
        format!("data:{};base64,{}", mime, STANDARD.encode(&self.0))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageData({} bytes)", self.0.len())
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for ImageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_data_url(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_builder() {
        let slide = Slide::with_id("s1", "Overview")
            .with_bullet("First")
            .with_bullets(["Second", "Third"])
            .with_notes("Say hello")
            .with_transition(SlideTransition::Push);

        assert_eq!(slide.id, "s1");
        assert_eq!(slide.bullets, vec!["First", "Second", "Third"]);
        assert_eq!(slide.notes(), Some("Say hello"));
        assert_eq!(slide.effective_transition(), SlideTransition::Push);
    }

    #[test]
    fn test_new_assigns_unique_ids() {
        let a = Slide::new("A");
        let b = Slide::new("A");
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_transition_defaults_to_fade() {
        let slide = Slide::with_id("s1", "Title");
        assert_eq!(slide.transition, None);
        assert_eq!(slide.effective_transition(), SlideTransition::Fade);
    }

    #[test]
    fn test_empty_payloads_count_as_absent() {
        let slide = Slide::with_id("s1", "T")
            .with_image(ImageData::default())
            .with_background(ImageData::from_bytes(Vec::new()))
            .with_notes("   ");

        assert!(slide.image_bytes().is_none());
        assert!(slide.background_bytes().is_none());
        assert!(slide.notes().is_none());
    }

    #[test]
    fn test_transition_xml() {
        assert_eq!(SlideTransition::None.to_xml(), "");
        assert!(SlideTransition::Fade.to_xml().contains("<p:fade/>"));
        assert!(SlideTransition::Uncover.to_xml().contains("<p:pull/>"));
        assert_eq!(
            SlideTransition::from_ooxml_element("pull"),
            Some(SlideTransition::Uncover)
        );
        assert_eq!(SlideTransition::from_ooxml_element("zoom"), None);
    }

    #[test]
    fn test_image_data_from_data_url() {
        let image = ImageData::from_data_url("data:image/png;base64,AQID").unwrap();
        assert_eq!(image.as_bytes(), &[1, 2, 3]);

        let bare = ImageData::from_data_url("AQID").unwrap();
        assert_eq!(bare, image);

        let wrapped = ImageData::from_data_url("data:image/png;base64,AQ\nID").unwrap();
        assert_eq!(wrapped, image);

        assert!(ImageData::from_data_url("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_deserialize_ui_snapshot() {
        let json = r#"{
            "id": "abc",
            "title": "Roadmap",
            "bullets": ["Q1", "Q2"],
            "speakerNotes": "Keep it short",
            "image": "data:image/png;base64,AQID",
            "transition": "uncover"
        }"#;

        let slide: Slide = serde_json::from_str(json).unwrap();
        assert_eq!(slide.title, "Roadmap");
        assert_eq!(slide.bullets, vec!["Q1", "Q2"]);
        assert_eq!(slide.speaker_notes.as_deref(), Some("Keep it short"));
        assert_eq!(slide.image_bytes(), Some(&[1u8, 2, 3][..]));
        assert!(slide.background_image.is_none());
        assert_eq!(slide.transition, Some(SlideTransition::Uncover));
    }

    #[test]
    fn test_deserialize_minimal_slide() {
        let slide: Slide = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(slide.title, "");
        assert!(slide.bullets.is_empty());
    }

    #[test]
    fn test_serialize_writes_data_url() {
        let slide = Slide::with_id("s", "T").with_image(ImageData::from_bytes(vec![1, 2, 3]));
        let json = serde_json::to_value(&slide).unwrap();
        assert_eq!(json["image"], "data:application/octet-stream;base64,AQID");
        assert!(json.get("speakerNotes").is_none());
    }
}
