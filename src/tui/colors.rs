//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::PriorityBand;

/// Border of the focused widget
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Status bar background while an error is shown
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Status bar background otherwise
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

pub const HIGH_RED: Color = Color::Rgb(220, 50, 47);
pub const MEDIUM_AMBER: Color = Color::Rgb(230, 160, 0);
pub const LOW_GREEN: Color = Color::Rgb(60, 170, 60);

/// Colour of a priority band; staged rows are grey.
pub fn band_color(band: Option<PriorityBand>) -> Color {
    match band {
        Some(PriorityBand::High) => HIGH_RED,
        Some(PriorityBand::Medium) => MEDIUM_AMBER,
        Some(PriorityBand::Low) => LOW_GREEN,
        None => Color::DarkGray,
    }
}
