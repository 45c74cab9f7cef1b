//! Slide figure and slide list widgets.

use crate::data::deck::{Deck, Slide};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap,
    },
};

/// One slide: bordered content, centered, with the caption on the last row
pub struct SlideView<'a> {
    slide: &'a Slide,
    title: String,
    border_style: Option<String>,
    show_caption: bool,
    text_color: Color,
}

impl<'a> SlideView<'a> {
    /// `index` is zero-based; the title reads "n/N"
    pub fn new(slide: &'a Slide, index: usize, count: usize) -> Self {
        Self {
            slide,
            title: format!("{}/{}", index + 1, count),
            border_style: None,
            show_caption: true,
            text_color: Color::White,
        }
    }

    pub fn set_border_style(&mut self, border_style: Option<String>) {
        self.border_style = border_style;
    }

    pub fn set_show_caption(&mut self, show: bool) {
        self.show_caption = show;
    }

    pub fn set_text_color(&mut self, color: Option<String>) {
        if let Some(color) = color.and_then(|c| super::parse_color(&c)) {
            self.text_color = color;
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        Clear.render(area, buf);

        let inner_area = match self.border_style.as_deref().and_then(super::border_type) {
            Some(border_type) => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_type(border_type)
                    .title(self.title.as_str());
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };

        if inner_area.height == 0 {
            return;
        }

        let caption = self.slide.caption().filter(|_| self.show_caption);
        let (content_area, caption_area) = match caption {
            Some(_) if inner_area.height > 1 => (
                Rect {
                    height: inner_area.height - 1,
                    ..inner_area
                },
                Some(Rect {
                    y: inner_area.y + inner_area.height - 1,
                    height: 1,
                    ..inner_area
                }),
            ),
            _ => (inner_area, None),
        };

        let lines: Vec<Line> = self
            .slide
            .lines()
            .into_iter()
            .map(|l| Line::from(l.trim_end().to_string()))
            .collect();
        let line_count = lines.len() as u16;

        // Vertically center when the content fits
        let top_pad = content_area.height.saturating_sub(line_count) / 2;
        let body = Rect {
            y: content_area.y + top_pad,
            height: content_area.height - top_pad,
            ..content_area
        };
        Paragraph::new(lines)
            .style(Style::default().fg(self.text_color))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(body, buf);

        if let (Some(text), Some(rect)) = (caption, caption_area) {
            Paragraph::new(Line::from(Span::styled(
                text.to_string(),
                Style::default()
                    .fg(self.text_color)
                    .add_modifier(Modifier::ITALIC),
            )))
            .alignment(Alignment::Center)
            .render(rect, buf);
        }
    }
}

/// Overview of every slide with the current one highlighted
pub struct SlideList<'a> {
    deck: &'a Deck,
    current: usize,
    border_style: Option<String>,
    show_notes: bool,
    highlight: Color,
}

impl<'a> SlideList<'a> {
    pub fn new(deck: &'a Deck, current: usize) -> Self {
        Self {
            deck,
            current,
            border_style: None,
            show_notes: false,
            highlight: Color::Blue,
        }
    }

    pub fn set_border_style(&mut self, border_style: Option<String>) {
        self.border_style = border_style;
    }

    pub fn set_show_notes(&mut self, show: bool) {
        self.show_notes = show;
    }

    pub fn set_highlight(&mut self, color: Option<String>) {
        if let Some(color) = color.and_then(|c| super::parse_color(&c)) {
            self.highlight = color;
        }
    }

    fn items(&self) -> Vec<ListItem<'a>> {
        self.deck
            .slides
            .iter()
            .enumerate()
            .map(|(i, slide)| {
                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        format!("{:>3}. ", i + 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(slide.title().to_string()),
                ])];
                if self.show_notes {
                    if let Some(notes) = slide.notes.as_deref() {
                        lines.extend(notes.lines().map(|n| {
                            Line::from(Span::styled(
                                format!("     {}", n),
                                Style::default().fg(Color::Gray),
                            ))
                        }));
                    }
                }
                ListItem::new(lines)
            })
            .collect()
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        Clear.render(area, buf);

        let mut list = List::new(self.items()).highlight_style(
            Style::default()
                .bg(self.highlight)
                .add_modifier(Modifier::BOLD),
        );
        if let Some(border_type) = self.border_style.as_deref().and_then(super::border_type) {
            list = list.block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(border_type)
                    .title(self.deck.title.as_str()),
            );
        }

        let mut state = ListState::default().with_selected(Some(self.current));
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn deck() -> Deck {
        Deck {
            title: "Talk".to_string(),
            timer: None,
            slides: vec![
                Slide::new("Hello").with_caption("Opening"),
                Slide::new("Second\nslide"),
                Slide::new("Third"),
            ],
        }
    }

    #[test]
    fn test_slide_centered_with_caption() {
        let deck = deck();
        let mut view = SlideView::new(&deck.slides[0], 0, deck.len());
        view.set_border_style(Some("plain".to_string()));
        let mut buf = Buffer::empty(Rect::new(0, 0, 21, 7));
        view.render(buf.area, &mut buf);

        assert!(row(&buf, 0).contains("1/3"));
        // inner rows 1..=5: content rows 1..=4, caption on row 5
        assert_eq!(row(&buf, 2).trim_matches(|c| c == '│' || c == ' '), "Hello");
        assert_eq!(row(&buf, 5).trim_matches(|c| c == '│' || c == ' '), "Opening");
    }

    #[test]
    fn test_caption_hidden_when_disabled() {
        let deck = deck();
        let mut view = SlideView::new(&deck.slides[0], 0, deck.len());
        view.set_show_caption(false);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 3));
        view.render(buf.area, &mut buf);
        let text: String = (0..3).map(|y| row(&buf, y)).collect();
        assert!(text.contains("Hello"));
        assert!(!text.contains("Opening"));
    }

    #[test]
    fn test_list_highlights_current() {
        let deck = deck();
        let list = SlideList::new(&deck, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 3));
        list.render(buf.area, &mut buf);

        assert!(row(&buf, 0).contains("1. Opening"));
        assert!(row(&buf, 1).contains("2. Second"));
        assert_eq!(buf[(6, 1)].bg, Color::Blue);
        assert_ne!(buf[(6, 0)].bg, Color::Blue);
    }

    #[test]
    fn test_list_shows_notes() {
        let mut deck = deck();
        deck.slides[0].notes = Some("breathe".to_string());
        let mut list = SlideList::new(&deck, 0);
        list.set_show_notes(true);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 4));
        list.render(buf.area, &mut buf);
        assert!(row(&buf, 1).contains("breathe"));
        assert!(row(&buf, 2).contains("2. Second"));
    }
}
