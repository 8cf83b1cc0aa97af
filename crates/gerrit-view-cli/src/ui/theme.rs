//! UI Theme - Design system constants
//!
//! This module defines the visual elements of the dashboard:
//! - Colors
//! - Border glyphs
//! - Spacing

use crossterm::style::Color;
use gerrit_view_core::ChangeStatus;

/// Default theme for the dashboard
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Colors for different UI elements
    pub colors: ColorScheme,
    /// Box drawing characters
    pub border: Border,
    /// Spacing constants
    pub layout: Layout,
}

impl Theme {
    /// Color for a status cell
    pub fn status_color(&self, status: ChangeStatus) -> Color {
        if status.is_positive() {
            self.colors.positive
        } else {
            self.colors.negative
        }
    }
}

/// Color scheme for UI elements
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Table body text
    pub body: Color,
    /// Column headers and footer
    pub header: Color,
    /// Merged / approved / succeeded
    pub positive: Color,
    /// Rejected / failed
    pub negative: Color,
    /// Connection problems in the footer
    pub warning: Color,
    /// Borders and dividers
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            body: Color::White,
            header: Color::White,
            positive: Color::Green,
            negative: Color::Red,
            warning: Color::Yellow,
            border: Color::DarkGrey,
        }
    }
}

/// Line box glyphs
#[derive(Debug, Clone)]
pub struct Border {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    /// Divider under the header and above the footer
    pub divider: char,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
            divider: '-',
        }
    }
}

/// Spacing constants
#[derive(Debug, Clone)]
pub struct Layout {
    /// Blank columns between table cells
    pub divide_chars: u16,
}

impl Default for Layout {
    fn default() -> Self {
        Self { divide_chars: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        let theme = Theme::default();
        assert_eq!(theme.status_color(ChangeStatus::Merged), Color::Green);
        assert_eq!(theme.status_color(ChangeStatus::Succeeded), Color::Green);
        assert_eq!(theme.status_color(ChangeStatus::Rejected), Color::Red);
        assert_eq!(theme.status_color(ChangeStatus::Failed), Color::Red);
    }
}
