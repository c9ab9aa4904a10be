//! Color themes

mod palettes;

pub use palettes::{DAYLIGHT, TOKYO_NIGHT};

use ratatui::style::Color;

/// A color theme for the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,

    // Background colors
    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_tertiary: Color,

    // Foreground colors
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    // Accent colors
    pub accent_primary: Color,
    pub accent_secondary: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // UI elements
    pub border: Color,
    pub border_focused: Color,
    pub selection: Color,
}

impl Theme {
    /// All built-in themes
    pub fn all() -> [&'static Theme; 2] {
        [&TOKYO_NIGHT, &DAYLIGHT]
    }

    /// Look up a built-in theme by name (case-insensitive)
    pub fn by_name(name: &str) -> Option<Theme> {
        Self::all().into_iter().find(|t| t.name.eq_ignore_ascii_case(name.trim())).cloned()
    }
}

impl Default for Theme {
    fn default() -> Self {
        TOKYO_NIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_tokyo_night() {
        assert_eq!(Theme::default().name, "Tokyo Night");
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(Theme::by_name("daylight").map(|t| t.name), Some("Daylight"));
        assert!(Theme::by_name("nope").is_none());
    }
}
