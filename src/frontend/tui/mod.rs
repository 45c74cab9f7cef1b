//! TUI Frontend (ratatui-based)
//!
//! Implements the Frontend trait using ratatui for terminal rendering and
//! crossterm for events. Widgets draw straight into the frame buffer.

pub mod app;
pub mod progress_bar;
pub mod slide_view;
pub mod timer_meter;

pub use app::TuiFrontend;

use chrono::Duration;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Parse a `#rrggbb` string
pub fn parse_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}

/// Border type for a config style name; `None` means no border
pub fn border_type(style: &str) -> Option<BorderType> {
    match style {
        "none" => None,
        "double" => Some(BorderType::Double),
        "rounded" => Some(BorderType::Rounded),
        "thick" => Some(BorderType::Thick),
        _ => Some(BorderType::Plain),
    }
}

/// `mm:ss`, or `h:mm:ss` past an hour
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color("00ff00"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("#gg0000"), None);
    }

    #[test]
    fn test_border_type() {
        assert_eq!(border_type("none"), None);
        assert_eq!(border_type("double"), Some(BorderType::Double));
        assert_eq!(border_type("whatever"), Some(BorderType::Plain));
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::seconds(0)), "00:00");
        assert_eq!(format_remaining(Duration::seconds(605)), "10:05");
        assert_eq!(format_remaining(Duration::seconds(3725)), "1:02:05");
        assert_eq!(format_remaining(Duration::seconds(-5)), "00:00");
    }
}
