//! Built-in palettes

use ratatui::style::Color;

use super::Theme;

/// Dark palette
pub const TOKYO_NIGHT: Theme = Theme {
    name: "Tokyo Night",

    bg_primary: Color::Rgb(26, 27, 38),   // #1a1b26
    bg_secondary: Color::Rgb(36, 40, 59), // #24283b
    bg_tertiary: Color::Rgb(65, 72, 104), // #414868

    fg_primary: Color::Rgb(169, 177, 214),   // #a9b1d6
    fg_secondary: Color::Rgb(192, 202, 245), // #c0caf5
    fg_muted: Color::Rgb(86, 95, 137),       // #565f89

    accent_primary: Color::Rgb(122, 162, 247),   // #7aa2f7
    accent_secondary: Color::Rgb(187, 154, 247), // #bb9af7

    success: Color::Rgb(158, 206, 106), // #9ece6a
    warning: Color::Rgb(224, 175, 104), // #e0af68
    error: Color::Rgb(247, 118, 142),   // #f7768e
    info: Color::Rgb(125, 207, 255),    // #7dcfff

    border: Color::Rgb(65, 72, 104),           // #414868
    border_focused: Color::Rgb(122, 162, 247), // #7aa2f7
    selection: Color::Rgb(40, 52, 87),         // #283457
};

/// Light palette
pub const DAYLIGHT: Theme = Theme {
    name: "Daylight",

    bg_primary: Color::Rgb(248, 250, 252),   // #f8fafc
    bg_secondary: Color::Rgb(255, 255, 255), // #ffffff
    bg_tertiary: Color::Rgb(226, 232, 240),  // #e2e8f0

    fg_primary: Color::Rgb(30, 41, 59),    // #1e293b
    fg_secondary: Color::Rgb(71, 85, 105), // #475569
    fg_muted: Color::Rgb(148, 163, 184),   // #94a3b8

    accent_primary: Color::Rgb(37, 99, 235),    // #2563eb
    accent_secondary: Color::Rgb(124, 58, 237), // #7c3aed

    success: Color::Rgb(34, 197, 94),  // #22c55e
    warning: Color::Rgb(217, 119, 6),  // #d97706
    error: Color::Rgb(239, 68, 68),    // #ef4444
    info: Color::Rgb(14, 165, 233),    // #0ea5e9

    border: Color::Rgb(226, 232, 240),        // #e2e8f0
    border_focused: Color::Rgb(37, 99, 235),  // #2563eb
    selection: Color::Rgb(219, 234, 254),     // #dbeafe
};
