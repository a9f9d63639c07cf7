//! Theme registry.
//!
//! A fixed table of four-colour palettes. Themes are process-wide
//! constants and are only ever looked up by identifier.

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a built-in presentation theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThemeId {
    /// Indigo header on white
    #[default]
    CorporateBlue,

    /// Emerald header on pale green
    ModernGreen,

    /// Violet header on lavender
    ElegantPurple,

    /// Slate header on off-white
    ClassicGray,

    /// Orange header on cream
    WarmOrange,
}

/// A named palette. Colours are six uppercase hex digits, no `#`, no alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Registry identifier
    pub id: ThemeId,

    /// Header bar fill
    pub header: &'static str,

    /// Title and body text
    pub text: &'static str,

    /// Slide background
    pub bg: &'static str,

    /// Bullet glyphs
    pub accent: &'static str,
}

static THEMES: [Theme; 5] = [
    Theme {
        id: ThemeId::CorporateBlue,
        header: "4F46E5",
        text: "363636",
        bg: "FFFFFF",
        accent: "4F46E5",
    },
    Theme {
        id: ThemeId::ModernGreen,
        header: "059669",
        text: "1F2937",
        bg: "F0FDF4",
        accent: "059669",
    },
    Theme {
        id: ThemeId::ElegantPurple,
        header: "7C3AED",
        text: "2E1065",
        bg: "FAF5FF",
        accent: "7C3AED",
    },
    Theme {
        id: ThemeId::ClassicGray,
        header: "374151",
        text: "111827",
        bg: "F9FAFB",
        accent: "4B5563",
    },
    Theme {
        id: ThemeId::WarmOrange,
        header: "EA580C",
        text: "431407",
        bg: "FFF7ED",
        accent: "EA580C",
    },
];

impl ThemeId {
    /// Every registered theme, in display order
    pub const ALL: [ThemeId; 5] = [
        ThemeId::CorporateBlue,
        ThemeId::ModernGreen,
        ThemeId::ElegantPurple,
        ThemeId::ClassicGray,
        ThemeId::WarmOrange,
    ];

    /// Canonical identifier string (`WARM_ORANGE`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CorporateBlue => "CORPORATE_BLUE",
            Self::ModernGreen => "MODERN_GREEN",
            Self::ElegantPurple => "ELEGANT_PURPLE",
            Self::ClassicGray => "CLASSIC_GRAY",
            Self::WarmOrange => "WARM_ORANGE",
        }
    }

    /// The palette for this identifier
    pub fn theme(&self) -> &'static Theme {
        // THEMES is declared in the same order as ALL
        &THEMES[*self as usize]
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = ExportError;

    /// Case-insensitive; `-` and spaces are accepted in place of `_`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| ExportError::unknown_theme(s))
    }
}

impl Theme {
    /// Human-readable name ("Warm Orange")
    pub fn display_name(&self) -> String {
        self.id
            .as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_string() + &chars.as_str().to_ascii_lowercase(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Look up a theme by identifier.
///
/// Unknown identifiers fail with [`ExportError::UnknownTheme`]; there is
/// no fallback palette.
pub fn resolve_theme(id: &str) -> Result<&'static Theme> {
    id.parse::<ThemeId>().map(|id| id.theme())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_ids() {
        for id in ThemeId::ALL {
            assert_eq!(id.theme().id, id);
        }
    }

    #[test]
    fn test_colors_are_six_hex_digits() {
        for id in ThemeId::ALL {
            let theme = id.theme();
            for color in [theme.header, theme.text, theme.bg, theme.accent] {
                assert_eq!(color.len(), 6, "{} in {}", color, id);
                assert!(
                    color.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)),
                    "{} in {}",
                    color,
                    id
                );
            }
        }
    }

    #[test]
    fn test_resolve_theme() {
        let theme = resolve_theme("WARM_ORANGE").unwrap();
        assert_eq!(theme.header, "EA580C");
        assert_eq!(theme.text, "431407");
        assert_eq!(theme.bg, "FFF7ED");
        assert_eq!(theme.accent, "EA580C");

        let theme = resolve_theme("CLASSIC_GRAY").unwrap();
        assert_eq!(theme.accent, "4B5563");
    }

    #[test]
    fn test_resolve_theme_lenient_spelling() {
        assert_eq!(resolve_theme("warm orange").unwrap().id, ThemeId::WarmOrange);
        assert_eq!(resolve_theme("modern-green").unwrap().id, ThemeId::ModernGreen);
        assert_eq!(resolve_theme(" elegant_purple ").unwrap().id, ThemeId::ElegantPurple);
    }

    #[test]
    fn test_unknown_theme_fails_fast() {
        let err = resolve_theme("NEON_PINK").unwrap_err();
        assert!(matches!(err, ExportError::UnknownTheme { ref id, .. } if id == "NEON_PINK"));

        assert!(resolve_theme("").is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(ThemeId::WarmOrange.theme().display_name(), "Warm Orange");
        assert_eq!(ThemeId::CorporateBlue.theme().display_name(), "Corporate Blue");
    }

    #[test]
    fn test_serde_identifier_form() {
        let json = serde_json::to_string(&ThemeId::ClassicGray).unwrap();
        assert_eq!(json, "\"CLASSIC_GRAY\"");

        let id: ThemeId = serde_json::from_str("\"WARM_ORANGE\"").unwrap();
        assert_eq!(id, ThemeId::WarmOrange);
    }

    #[test]
    fn test_default_theme() {
        assert_eq!(ThemeId::default(), ThemeId::CorporateBlue);
    }
}
