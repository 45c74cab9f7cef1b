//! Slide progress bar shown under the slide.
//!
//! Fills proportionally to the deck position and overlays "current/total"
//! text, simplified when the bar is too narrow.

use crate::core::position::SlidePosition;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Widget},
};

pub struct SlideProgressBar {
    label: String,
    position: SlidePosition,
    border_style: Option<String>,
    bar_fill: Color,
    text_color: Color,
}

impl SlideProgressBar {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            position: SlidePosition::default(),
            border_style: None,
            bar_fill: Color::Blue,
            text_color: Color::White,
        }
    }

    pub fn set_border_style(&mut self, border_style: Option<String>) {
        self.border_style = border_style;
    }

    pub fn set_colors(&mut self, bar_fill: Option<String>, text_color: Option<String>) {
        if let Some(fill) = bar_fill.and_then(|c| super::parse_color(&c)) {
            self.bar_fill = fill;
        }
        if let Some(text) = text_color.and_then(|c| super::parse_color(&c)) {
            self.text_color = text;
        }
    }

    pub fn set_position(&mut self, position: SlidePosition) {
        self.position = position;
    }

    /// Slide number (one-based) and slide count
    fn counts(&self) -> (usize, usize) {
        (self.position.value + 1, self.position.max + 1)
    }

    /// Text variants from most to least detailed
    fn text_options(&self) -> Vec<String> {
        let (slide, count) = self.counts();
        let percent = self.position.slides_percent();
        vec![
            format!("{}/{} ({}%)", slide, count, percent),
            format!("{}/{}", slide, count),
            format!("{}", slide),
        ]
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        Clear.render(area, buf);

        let inner_area = match self.border_style.as_deref().and_then(super::border_type) {
            Some(border_type) => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_type(border_type)
                    .title(self.label.as_str());
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        if inner_area.width == 0 || inner_area.height == 0 {
            return;
        }

        let available_width = inner_area.width;
        let split_position =
            (f64::from(self.position.slides_percent()) / 100.0 * f64::from(available_width)) as u16;

        let y = inner_area.y;
        for i in 0..available_width {
            let x = inner_area.x + i;
            buf[(x, y)].set_char(' ');
            if i < split_position {
                buf[(x, y)].set_bg(self.bar_fill);
            }
        }

        // Pick the first text that fits
        let text = self
            .text_options()
            .into_iter()
            .find(|t| t.chars().count() as u16 <= available_width)
            .unwrap_or_default();
        let text_width = text.chars().count() as u16;
        let text_start = inner_area.x + available_width.saturating_sub(text_width) / 2;
        for (i, c) in text.chars().enumerate() {
            let x = text_start + i as u16;
            let cell = &mut buf[(x, y)];
            cell.set_char(c);
            cell.set_style(Style::default().fg(self.text_color));
            if x - inner_area.x < split_position {
                cell.set_bg(self.bar_fill);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_text_fits_width() {
        let mut bar = SlideProgressBar::new("Slides");
        bar.set_position(SlidePosition::new(2, 9));
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 1));
        bar.render(buf.area, &mut buf);
        assert!(row(&buf, 0).contains("3/10 (22%)"));

        let mut narrow = Buffer::empty(Rect::new(0, 0, 6, 1));
        bar.render(narrow.area, &mut narrow);
        assert_eq!(row(&narrow, 0).trim(), "3/10");
    }

    #[test]
    fn test_fill_follows_position() {
        let mut bar = SlideProgressBar::new("Slides");
        bar.set_colors(Some("#102030".to_string()), None);
        bar.set_position(SlidePosition::new(1, 2));
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        bar.render(buf.area, &mut buf);
        // 50% of 10 columns
        assert_eq!(buf[(4, 0)].bg, Color::Rgb(16, 32, 48));
        assert_ne!(buf[(5, 0)].bg, Color::Rgb(16, 32, 48));
    }

    #[test]
    fn test_border_takes_title() {
        let mut bar = SlideProgressBar::new("Slides");
        bar.set_border_style(Some("plain".to_string()));
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 3));
        bar.render(buf.area, &mut buf);
        assert!(row(&buf, 0).contains("Slides"));
        assert!(row(&buf, 1).contains("1/1"));
    }
}
