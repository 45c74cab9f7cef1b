//! Timer meter widget.
//!
//! Draws the elapsed-time bar colored by gauge level, with the `low`/`high`
//! thresholds as markers and the time readout centered on top.

use crate::config::MeterColors;
use crate::core::meter::{MeterLevel, MeterState};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Widget},
};

const MARKER: char = '┃';

pub struct TimerMeter {
    label: String,
    meter: MeterState,
    show_markers: bool,
    text_options: Vec<String>,
    border_style: Option<String>,
    optimum_color: Color,
    suboptimum_color: Color,
    critical_color: Color,
    marker_color: Color,
    text_color: Color,
}

impl TimerMeter {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            meter: MeterState::new(),
            show_markers: false,
            text_options: Vec::new(),
            border_style: None,
            optimum_color: Color::Green,
            suboptimum_color: Color::Yellow,
            critical_color: Color::Red,
            marker_color: Color::Gray,
            text_color: Color::White,
        }
    }

    pub fn set_border_style(&mut self, border_style: Option<String>) {
        self.border_style = border_style;
    }

    pub fn set_colors(&mut self, colors: &MeterColors) {
        let set = |slot: &mut Color, hex: &str| {
            if let Some(color) = super::parse_color(hex) {
                *slot = color;
            }
        };
        set(&mut self.optimum_color, &colors.optimum);
        set(&mut self.suboptimum_color, &colors.suboptimum);
        set(&mut self.critical_color, &colors.critical);
        set(&mut self.marker_color, &colors.marker);
    }

    pub fn set_text_color(&mut self, color: Option<String>) {
        if let Some(color) = color.and_then(|c| super::parse_color(&c)) {
            self.text_color = color;
        }
    }

    /// Markers only make sense when the thresholds track the slides
    pub fn set_meter(&mut self, meter: MeterState, show_markers: bool) {
        self.meter = meter;
        self.show_markers = show_markers;
    }

    /// Readouts from most to least detailed; the first that fits is drawn
    pub fn set_text_options(&mut self, options: Vec<String>) {
        self.text_options = options;
    }

    fn fill_color(&self) -> Color {
        match self.meter.level() {
            MeterLevel::Optimum => self.optimum_color,
            MeterLevel::Suboptimum => self.suboptimum_color,
            MeterLevel::Critical => self.critical_color,
        }
    }

    /// Column within `width` for a 0..100 meter value
    fn column(value: f64, width: u16) -> u16 {
        if width == 0 {
            return 0;
        }
        let col = (value / 100.0 * f64::from(width)).round() as u16;
        col.min(width - 1)
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

        let width = inner_area.width;
        let y = inner_area.y;
        let fill = self.fill_color();
        let split_position = (self.meter.ratio() * f64::from(width)) as u16;

        for i in 0..width {
            let x = inner_area.x + i;
            buf[(x, y)].set_char(' ');
            if i < split_position {
                buf[(x, y)].set_bg(fill);
            }
        }

        if self.show_markers {
            for value in [self.meter.low, self.meter.high] {
                let x = inner_area.x + Self::column(value, width);
                buf[(x, y)].set_char(MARKER);
                buf[(x, y)].set_fg(self.marker_color);
            }
        }

        let Some(text) = self
            .text_options
            .iter()
            .find(|t| t.chars().count() as u16 <= width)
        else {
            return;
        };
        let text_width = text.chars().count() as u16;
        let text_start = inner_area.x + (width - text_width) / 2;
        for (i, c) in text.chars().enumerate() {
            let x = text_start + i as u16;
            let cell = &mut buf[(x, y)];
            cell.set_char(c);
            cell.set_style(
                Style::default()
                    .fg(self.text_color)
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}
