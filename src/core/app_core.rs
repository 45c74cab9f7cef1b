use crate::config::Config;
use crate::core::messages::{MessageBus, PresentationEvent};
use crate::core::position::{position_channel, PositionPublisher, SlidePosition};
use crate::core::scheduler::{Clock, FrameScheduler};
use crate::core::timer::{Timer, TimerContext};
use crate::data::deck::{Deck, Slide};
use crate::frontend::FrontendEvent;
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyModifiers};
use std::sync::Arc;

/// How the deck is being shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Overview of all slides
    List,
    /// One slide filling the screen
    Fullscreen,
}

/// Startup options from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct StartOptions {
    pub fullscreen: bool,
    /// Zero-based slide to open on
    pub slide: usize,
}

/// Core application state (frontend-agnostic)
///
/// Owns the deck, the navigation position, the message bus and the optional
/// timer with its frame scheduler. Frontends read from it and feed it events.
pub struct AppCore {
    pub config: Config,
    deck: Deck,
    current: usize,
    view: ViewMode,
    bus: MessageBus,
    positions: PositionPublisher,
    timer: Option<Timer>,
    scheduler: FrameScheduler<Timer>,
    running: bool,
}

impl AppCore {
    pub fn new(
        config: Config,
        deck: Deck,
        clock: Arc<dyn Clock>,
        options: StartOptions,
    ) -> Result<Self> {
        let current = options.slide.min(deck.len().saturating_sub(1));
        let view = if options.fullscreen {
            ViewMode::Fullscreen
        } else {
            ViewMode::List
        };
        let bus = MessageBus::new();
        let (positions, position) = position_channel(SlidePosition::for_slide(current, deck.len()));

        let mut scheduler = FrameScheduler::new();
        let timer = match &deck.timer {
            Some(attrs) => {
                let mut timer = Timer::new(
                    attrs,
                    TimerContext {
                        clock,
                        bus: &bus,
                        position: Some(position),
                        defaults: config.timer_defaults,
                        fullscreen: view == ViewMode::Fullscreen,
                    },
                )
                .context("Invalid timer configuration")?;
                timer.arm(&mut scheduler);
                Some(timer)
            }
            None => None,
        };

        tracing::info!(
            title = %deck.title,
            slides = deck.len(),
            current,
            timer = timer.is_some(),
            "presentation ready"
        );

        Ok(Self {
            config,
            deck,
            current,
            view,
            bus,
            positions,
            timer,
            scheduler,
            running: true,
        })
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.deck.get(self.current)
    }

    pub fn position(&self) -> SlidePosition {
        self.positions.current()
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn timer(&self) -> Option<&Timer> {
        self.timer.as_ref()
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Jump to `index`. Returns false if it is out of range or already current.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.deck.len() || index == self.current {
            return false;
        }
        self.current = index;
        let position = SlidePosition::for_slide(index, self.deck.len());
        self.positions.publish(position);
        self.bus.publish(PresentationEvent::SlideChanged(position));
        tracing::debug!(slide = index + 1, of = self.deck.len(), "slide changed");
        true
    }

    pub fn next_slide(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn previous_slide(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    pub fn first_slide(&mut self) -> bool {
        self.go_to(0)
    }

    pub fn last_slide(&mut self) -> bool {
        self.go_to(self.deck.len().saturating_sub(1))
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        let view = if fullscreen {
            ViewMode::Fullscreen
        } else {
            ViewMode::List
        };
        if view == self.view {
            return;
        }
        self.view = view;
        self.bus.publish(PresentationEvent::FullscreenChanged(fullscreen));
        tracing::debug!(fullscreen, "view changed");
    }

    pub fn toggle_fullscreen(&mut self) {
        self.set_fullscreen(self.view == ViewMode::List);
    }

    pub fn quit(&mut self) {
        if self.running {
            self.running = false;
            self.bus.publish(PresentationEvent::Quit);
        }
    }

    /// One frame: deliver bus events to the timer, then run due callbacks
    pub fn tick(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.handle_messages(&mut self.scheduler);
            self.scheduler.run_frame(timer);
        }
    }

    /// Apply a frontend event. Returns false once the app should exit.
    pub fn handle_event(&mut self, event: &FrontendEvent) -> bool {
        match event {
            FrontendEvent::Key { code, modifiers } => self.handle_key(*code, *modifiers),
            FrontendEvent::Resize { .. } => {}
            FrontendEvent::Quit => self.quit(),
        }
        self.running
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if code == KeyCode::Char('c') {
                self.quit();
            }
            return;
        }

        match code {
            KeyCode::Right
            | KeyCode::Down
            | KeyCode::PageDown
            | KeyCode::Char(' ')
            | KeyCode::Char('l')
            | KeyCode::Char('n') => {
                self.next_slide();
            }
            KeyCode::Left
            | KeyCode::Up
            | KeyCode::PageUp
            | KeyCode::Backspace
            | KeyCode::Char('h')
            | KeyCode::Char('p') => {
                self.previous_slide();
            }
            KeyCode::Home => {
                self.first_slide();
            }
            KeyCode::End => {
                self.last_slide();
            }
            KeyCode::Enter | KeyCode::Char('f') => self.toggle_fullscreen(),
            KeyCode::Esc => self.set_fullscreen(false),
            KeyCode::Char('q') => self.quit(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::ManualClock;
    use crate::core::timer::{AttributeValue, TimerAttributes};
    use chrono::{Duration, TimeZone, Utc};

    fn deck(count: usize, timer: Option<TimerAttributes>) -> Deck {
        Deck {
            title: "test".to_string(),
            timer,
            slides: (0..count).map(|i| Slide::new(&format!("slide {}", i))).collect(),
        }
    }

    fn relative_timer() -> TimerAttributes {
        TimerAttributes {
            duration: Some(AttributeValue::Integer(10)),
            relative: true,
            ..Default::default()
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()))
    }

    fn core(deck: Deck, clock: &Arc<ManualClock>, options: StartOptions) -> Result<AppCore> {
        let clock: Arc<dyn Clock> = clock.clone();
        AppCore::new(Config::default(), deck, clock, options)
    }

    fn key(c: char) -> FrontendEvent {
        FrontendEvent::key(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_bounds() {
        let mut app = core(deck(3, None), &clock(), StartOptions::default()).unwrap();
        assert_eq!(app.current_index(), 0);
        assert!(!app.previous_slide());
        assert!(app.next_slide());
        assert!(app.last_slide());
        assert!(!app.next_slide());
        assert_eq!(app.current_index(), 2);
        assert_eq!(app.position(), SlidePosition::new(2, 2));
        assert!(app.first_slide());
        assert!(!app.go_to(7));
    }

    #[test]
    fn test_start_slide_is_clamped() {
        let options = StartOptions {
            fullscreen: true,
            slide: 99,
        };
        let app = core(deck(4, None), &clock(), options).unwrap();
        assert_eq!(app.current_index(), 3);
        assert_eq!(app.view(), ViewMode::Fullscreen);
    }

    #[test]
    fn test_slide_changes_are_published() {
        let mut app = core(deck(3, None), &clock(), StartOptions::default()).unwrap();
        let mut sub = app.bus().subscribe();
        app.next_slide();
        app.toggle_fullscreen();
        app.toggle_fullscreen();
        assert_eq!(
            sub.drain(),
            vec![
                PresentationEvent::SlideChanged(SlidePosition::new(1, 2)),
                PresentationEvent::FullscreenChanged(true),
                PresentationEvent::FullscreenChanged(false),
            ]
        );
    }

    #[test]
    fn test_invalid_timer_aborts_startup() {
        let attrs = TimerAttributes::default();
        let result = core(deck(2, Some(attrs)), &clock(), StartOptions::default());
        let err = result.err().unwrap();
        assert!(format!("{:#}", err).contains("Duration should be defined"));
    }

    #[test]
    fn test_timer_starts_on_fullscreen() {
        let clock = clock();
        let deck = deck(11, Some(relative_timer()));
        let mut app = core(deck, &clock, StartOptions::default()).unwrap();
        app.tick();
        assert_eq!(app.timer().unwrap().meter().value, 50.0); // untouched while in list view

        app.handle_event(&FrontendEvent::key(KeyCode::Enter, KeyModifiers::NONE));
        for _ in 0..4 {
            app.handle_event(&key(' '));
        }
        clock.advance(Duration::minutes(6));
        app.tick();
        assert!(app.timer().unwrap().is_ticking());

        let meter = app.timer().unwrap().meter();
        assert_eq!(meter.value, 60.0);
        assert_eq!(meter.optimum, 40.0);
        assert_eq!(meter.low, 70.0);
        assert_eq!(meter.high, 90.0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = core(deck(1, None), &clock(), StartOptions::default()).unwrap();
        assert!(app.handle_event(&key('x')));
        assert!(!app.handle_event(&FrontendEvent::key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!app.is_running());

        let mut app = core(deck(1, None), &clock(), StartOptions::default()).unwrap();
        assert!(!app.handle_event(&key('q')));
    }

    #[test]
    fn test_escape_leaves_fullscreen() {
        let options = StartOptions {
            fullscreen: true,
            slide: 0,
        };
        let mut app = core(deck(2, None), &clock(), options).unwrap();
        app.handle_event(&FrontendEvent::key(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.view(), ViewMode::List);
    }
}
