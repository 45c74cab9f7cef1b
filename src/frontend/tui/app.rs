use super::progress_bar::SlideProgressBar;
use super::slide_view::{SlideList, SlideView};
use super::timer_meter::TimerMeter;
use crate::core::app_core::ViewMode;
use crate::core::timer::Timer;
use crate::core::AppCore;
use crate::frontend::{Frontend, FrontendEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Paragraph, Widget},
    Terminal,
};
use std::io;
use std::time::Duration;

const HELP: &str = "←/→ move  Home/End jump  Enter fullscreen  Esc list  q quit";

/// TUI Frontend using ratatui
///
/// Renders the presentation with ratatui and reads input via crossterm.
pub struct TuiFrontend {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    poll_timeout: Duration,
    restored: bool,
}

impl TuiFrontend {
    /// Initializes terminal in raw mode and enters the alternate screen.
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            poll_timeout: Duration::ZERO,
            restored: false,
        })
    }

    /// Convert crossterm event to FrontendEvent
    fn convert_event(event: Event) -> Option<FrontendEvent> {
        match event {
            Event::Key(key_event) => {
                // Only key presses; repeats and releases are ignored
                if key_event.kind != KeyEventKind::Press {
                    return None;
                }
                Some(FrontendEvent::key(key_event.code, key_event.modifiers))
            }
            Event::Resize(w, h) => Some(FrontendEvent::resize(w, h)),
            _ => None,
        }
    }
}

/// Meter widget for the timer's current state
fn timer_widget(app: &AppCore, timer: &Timer) -> TimerMeter {
    let ui = &app.config.ui;
    let mut meter = TimerMeter::new(timer.label());
    meter.set_border_style(Some(ui.border_style.clone()));
    meter.set_colors(&ui.meter_colors);
    meter.set_text_color(Some(ui.text_color.clone()));
    meter.set_meter(*timer.meter(), timer.is_relative());
    let remaining = super::format_remaining(timer.remaining());
    let options = if timer.is_finished() {
        vec!["Time is up".to_string(), remaining]
    } else {
        let elapsed = timer.elapsed_percent().floor();
        vec![format!("{}  {}%", remaining, elapsed), remaining]
    };
    meter.set_text_options(options);
    meter
}

fn progress_widget(app: &AppCore) -> SlideProgressBar {
    let ui = &app.config.ui;
    let mut bar = SlideProgressBar::new("Slides");
    bar.set_border_style(Some(ui.border_style.clone()));
    bar.set_colors(Some(ui.progress_color.clone()), Some(ui.text_color.clone()));
    bar.set_position(app.position());
    bar
}

/// Height of a one-row widget with its border
fn bar_height(app: &AppCore) -> u16 {
    if super::border_type(&app.config.ui.border_style).is_some() {
        3
    } else {
        1
    }
}

fn render_fullscreen(app: &AppCore, area: Rect, buf: &mut Buffer) {
    let bar = bar_height(app);
    let timer = app.timer().filter(|t| t.is_visible());
    let [slide_area, progress_area, meter_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(bar),
        Constraint::Length(if timer.is_some() { bar } else { 0 }),
    ])
    .areas(area);

    if let Some(slide) = app.current_slide() {
        let ui = &app.config.ui;
        let mut view = SlideView::new(slide, app.current_index(), app.deck().len());
        view.set_border_style(Some(ui.border_style.clone()));
        view.set_show_caption(ui.show_caption);
        view.set_text_color(Some(ui.text_color.clone()));
        view.render(slide_area, buf);
    }
    progress_widget(app).render(progress_area, buf);
    if let Some(timer) = timer {
        timer_widget(app, timer).render(meter_area, buf);
    }
}

fn render_list(app: &AppCore, area: Rect, buf: &mut Buffer) {
    let bar = bar_height(app);
    let timer = app.timer().filter(|t| t.is_visible());
    let [list_area, progress_area, meter_area, help_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(bar),
        Constraint::Length(if timer.is_some() { bar } else { 0 }),
        Constraint::Length(1),
    ])
    .areas(area);

    let ui = &app.config.ui;
    let mut list = SlideList::new(app.deck(), app.current_index());
    list.set_border_style(Some(ui.border_style.clone()));
    list.set_show_notes(ui.show_notes);
    list.set_highlight(Some(ui.progress_color.clone()));
    list.render(list_area, buf);

    progress_widget(app).render(progress_area, buf);
    if let Some(timer) = timer {
        timer_widget(app, timer).render(meter_area, buf);
    }
    Paragraph::new(Line::from(HELP))
        .style(Style::default().fg(Color::DarkGray))
        .render(help_area, buf);
}

/// Draw one frame of `app` into `buf`
pub fn draw(app: &AppCore, area: Rect, buf: &mut Buffer) {
    match app.view() {
        ViewMode::Fullscreen => render_fullscreen(app, area, buf),
        ViewMode::List => render_list(app, area, buf),
    }
}

impl Frontend for TuiFrontend {
    fn poll_events(&mut self) -> Result<Vec<FrontendEvent>> {
        let mut events = Vec::new();

        while event::poll(self.poll_timeout)? {
            if let Ok(ev) = event::read() {
                if let Some(frontend_event) = Self::convert_event(ev) {
                    events.push(frontend_event);
                }
            }
        }

        Ok(events)
    }

    fn render(&mut self, app: &AppCore) -> Result<()> {
        self.terminal.draw(|f| {
            let area = f.area();
            draw(app, area, f.buffer_mut());
        })?;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TuiFrontend {
    fn drop(&mut self) {
        // Restore the terminal even if cleanup() wasn't called
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::app_core::StartOptions;
    use crate::core::scheduler::{Clock, ManualClock};
    use crate::core::timer::{AttributeValue, TimerAttributes};
    use crate::data::deck::{Deck, Slide};
    use chrono::{TimeZone, Utc};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::Arc;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()))
    }

    fn app(fullscreen: bool, show_in_list: bool) -> AppCore {
        app_with_clock(&clock(), fullscreen, show_in_list)
    }

    fn app_with_clock(clock: &Arc<ManualClock>, fullscreen: bool, show_in_list: bool) -> AppCore {
        let deck = Deck {
            title: "Talk".to_string(),
            timer: Some(TimerAttributes {
                label: Some("Clock".to_string()),
                duration: Some(AttributeValue::Integer(10)),
                show_in_list,
                ..Default::default()
            }),
            slides: vec![Slide::new("Alpha"), Slide::new("Beta")],
        };
        let clock: Arc<dyn Clock> = clock.clone();
        let options = StartOptions {
            fullscreen,
            slide: 0,
        };
        AppCore::new(Config::default(), deck, clock, options).unwrap()
    }

    fn screen(app: &AppCore) -> String {
        let mut buf = Buffer::empty(Rect::new(0, 0, 60, 16));
        draw(app, buf.area, &mut buf);
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_fullscreen_shows_slide_and_timer() {
        let app = app(true, false);
        let text = screen(&app);
        assert!(text.contains("Alpha"));
        assert!(text.contains("1/2"));
        assert!(text.contains("Clock"));
        assert!(text.contains("10:00  0%"));
    }

    #[test]
    fn test_meter_readout_tracks_elapsed_time() {
        let clock = clock();
        let mut app = app_with_clock(&clock, true, false);
        clock.advance(chrono::Duration::minutes(4));
        app.tick();
        assert!(screen(&app).contains("06:00  40%"));

        clock.advance(chrono::Duration::minutes(7));
        app.tick();
        let text = screen(&app);
        assert!(text.contains("Time is up"));
        assert!(!text.contains("110%"));
    }

    #[test]
    fn test_list_hides_timer_unless_requested() {
        let hidden = screen(&app(false, false));
        assert!(hidden.contains("1. Alpha"));
        assert!(hidden.contains("2. Beta"));
        assert!(!hidden.contains("Clock"));
        assert!(hidden.contains("q quit"));

        let shown = screen(&app(false, true));
        assert!(shown.contains("Clock"));
    }

    #[test]
    fn test_convert_event_ignores_releases() {
        let press = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(
            TuiFrontend::convert_event(Event::Key(press)),
            Some(FrontendEvent::key(KeyCode::Right, KeyModifiers::NONE))
        );

        let mut release = press;
        release.kind = KeyEventKind::Release;
        assert_eq!(TuiFrontend::convert_event(Event::Key(release)), None);
        assert_eq!(
            TuiFrontend::convert_event(Event::Resize(80, 24)),
            Some(FrontendEvent::resize(80, 24))
        );
    }
}
