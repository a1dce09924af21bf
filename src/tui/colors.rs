//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Priority indicator colours, low to high.

/// Used for low priority
pub const CALM_GREEN: Color = Color::Rgb(80, 160, 80);
/// Used for medium priority
pub const AMBER: Color = Color::Rgb(230, 170, 0);
/// Used for high priority
pub const ALERT_RED: Color = Color::Rgb(200, 40, 40);

/// Used for overdue due dates
pub const OVERDUE_RED: Color = Color::Rgb(255, 90, 90);
/// Used for category tags
pub const TAG_BLUE: Color = Color::Rgb(90, 140, 220);
