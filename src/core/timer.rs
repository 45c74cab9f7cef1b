//! Presentation countdown timer
//!
//! A timer is configured from attribute-like values (usually a `[timer]` table
//! in the deck file), validated once, and then recalculated on every frame
//! while it is visible. In relative mode it also compares elapsed time with
//! slide progress and moves the meter's warning bands accordingly.

use crate::core::messages::{MessageBus, PresentationEvent, Subscription};
use crate::core::meter::MeterState;
use crate::core::position::PositionHandle;
use crate::core::progress::{evaluate, ProgressSample, ThresholdConfig};
use crate::core::scheduler::{Clock, Scheduler};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_LABEL: &str = "Timer";

/// Configuration errors. Raised once, when the timer is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Start time is incorrect: {0:?}")]
    InvalidStartTime(String),

    #[error("Duration should be defined")]
    MissingDuration,

    #[error("Timer end time in the past")]
    DeadlineAlreadyPassed,

    #[error("Progress bar not found")]
    MissingProgressProvider,
}

/// A raw attribute value: TOML lets users write `duration = 20` or
/// `duration = "20min"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    /// Leading integer, ignoring trailing text ("20min" -> 20)
    pub fn integer_prefix(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => parse_integer_prefix(s),
        }
    }

    /// Whole value as a number ("12.5" -> 12.5, "12px" -> None)
    pub fn number(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) if f.is_finite() => Some(*f),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }
}

fn parse_integer_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Timer attributes as written in a deck file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Absolute start time; absent means "when the timer is built"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts: Option<String>,
    /// Length of the talk in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<AttributeValue>,
    #[serde(default)]
    pub relative: bool,
    #[serde(default, alias = "show-in-list")]
    pub show_in_list: bool,
    #[serde(default, alias = "rush-for", skip_serializing_if = "Option::is_none")]
    pub rush_for: Option<AttributeValue>,
    #[serde(
        default,
        alias = "rush-for-critical",
        skip_serializing_if = "Option::is_none"
    )]
    pub rush_for_critical: Option<AttributeValue>,
    #[serde(default, alias = "late-for", skip_serializing_if = "Option::is_none")]
    pub late_for: Option<AttributeValue>,
    #[serde(
        default,
        alias = "late-for-critical",
        skip_serializing_if = "Option::is_none"
    )]
    pub late_for_critical: Option<AttributeValue>,
}

/// Collaborators a timer needs at construction
pub struct TimerContext<'a> {
    pub clock: Arc<dyn Clock>,
    pub bus: &'a MessageBus,
    /// Required in relative mode
    pub position: Option<PositionHandle>,
    /// Used for threshold attributes that are absent or unreadable
    pub defaults: ThresholdConfig,
    /// Whether the presentation is fullscreen right now
    pub fullscreen: bool,
}

struct RelativeMode {
    thresholds: ThresholdConfig,
    position: PositionHandle,
}

pub struct Timer {
    label: String,
    start: DateTime<Utc>,
    duration: Duration,
    /// `start + duration`, checked to fit at construction
    deadline: DateTime<Utc>,
    show_in_list: bool,
    fullscreen: bool,
    relative: Option<RelativeMode>,
    meter: MeterState,
    tick_pending: bool,
    finished: bool,
    /// Set once the presentation quits; nothing reschedules after that
    closed: bool,
    clock: Arc<dyn Clock>,
    subscription: Subscription,
}

impl Timer {
    /// Validate `attrs` and build a timer. Nothing is scheduled yet; call
    /// [`Timer::arm`] once the timer is attached to a frame scheduler.
    pub fn new(attrs: &TimerAttributes, ctx: TimerContext<'_>) -> Result<Self, TimerError> {
        let now = ctx.clock.now();

        let starts = match attrs.starts.as_deref() {
            Some(raw) => {
                let parsed = parse_start_time(raw);
                Some(parsed.ok_or_else(|| TimerError::InvalidStartTime(raw.to_string()))?)
            }
            None => None,
        };

        let minutes = attrs
            .duration
            .as_ref()
            .and_then(AttributeValue::integer_prefix)
            .filter(|m| *m > 0)
            .ok_or(TimerError::MissingDuration)?;
        // Durations too long to put on a calendar are as good as undefined
        let duration = Duration::try_minutes(minutes).ok_or(TimerError::MissingDuration)?;
        let start = starts.unwrap_or(now);
        let deadline = start
            .checked_add_signed(duration)
            .ok_or(TimerError::MissingDuration)?;

        if starts.is_some() && deadline < now {
            return Err(TimerError::DeadlineAlreadyPassed);
        }

        let relative = if attrs.relative {
            let position = ctx.position.ok_or(TimerError::MissingProgressProvider)?;
            Some(RelativeMode {
                thresholds: resolve_thresholds(attrs, &ctx.defaults),
                position,
            })
        } else {
            None
        };

        let label = attrs
            .label
            .clone()
            .unwrap_or_else(|| DEFAULT_LABEL.to_string());
        tracing::debug!(
            label = %label,
            start = %start,
            minutes,
            relative = relative.is_some(),
            show_in_list = attrs.show_in_list,
            "timer configured"
        );

        Ok(Self {
            label,
            start,
            duration,
            deadline,
            show_in_list: attrs.show_in_list,
            fullscreen: ctx.fullscreen,
            relative,
            meter: MeterState::new(),
            tick_pending: false,
            finished: false,
            closed: false,
            clock: ctx.clock,
            subscription: ctx.bus.subscribe(),
        })
    }

    /// Start the frame loop if the timer is currently visible
    pub fn arm(&mut self, scheduler: &mut dyn Scheduler<Timer>) {
        if self.is_visible() && !self.tick_pending {
            self.tick_pending = true;
            scheduler.schedule_next_tick(Box::new(Timer::calculate));
        }
    }

    /// Apply pending bus events.
    ///
    /// Fullscreen changes re-arm the loop. A slide change after the deadline
    /// recomputes the band once so it keeps tracking the slides. Quit closes
    /// the timer for good.
    pub fn handle_messages(&mut self, scheduler: &mut dyn Scheduler<Timer>) {
        for event in self.subscription.drain() {
            match event {
                PresentationEvent::FullscreenChanged(fullscreen) => {
                    self.fullscreen = fullscreen;
                    self.arm(scheduler);
                }
                PresentationEvent::SlideChanged(_) => {
                    if self.finished && self.is_relative() {
                        self.arm(scheduler);
                    }
                }
                PresentationEvent::Quit => {
                    self.closed = true;
                    tracing::debug!(label = %self.label, "timer closed");
                }
            }
        }
    }

    /// One frame: update the meter, then reschedule while time remains and
    /// the timer is visible
    pub fn calculate(&mut self, scheduler: &mut dyn Scheduler<Timer>) {
        self.tick_pending = false;

        let passed = self.clock.now() - self.start;
        let percent = self.percent_of(passed);
        self.meter.set_value(percent);

        if let Some(relative) = &self.relative {
            let slides_percent = f64::from(relative.position.current().slides_percent());
            let sample = ProgressSample::new(slides_percent, percent.floor());
            let band = evaluate(sample, &relative.thresholds);
            self.meter.apply_band(band);
        }

        if passed < self.duration {
            if self.is_visible() {
                self.tick_pending = true;
                scheduler.schedule_next_tick(Box::new(Timer::calculate));
            }
        } else if !self.finished {
            self.finished = true;
            tracing::info!(label = %self.label, "timer finished");
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.closed && (self.fullscreen || self.show_in_list)
    }

    pub fn is_relative(&self) -> bool {
        self.relative.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_pending
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn meter(&self) -> &MeterState {
        &self.meter
    }

    pub fn thresholds(&self) -> Option<&ThresholdConfig> {
        self.relative.as_ref().map(|r| &r.thresholds)
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Share of the duration already gone, in percent. Not capped at 100;
    /// 0 before the start time.
    pub fn elapsed_percent(&self) -> f64 {
        self.percent_of(self.clock.now() - self.start)
    }

    fn percent_of(&self, passed: Duration) -> f64 {
        let total_ms = self.duration.num_milliseconds().max(1) as f64;
        (100.0 * passed.num_milliseconds() as f64 / total_ms).max(0.0)
    }

    /// Time left before the deadline, never negative
    pub fn remaining(&self) -> Duration {
        let left = self.deadline - self.clock.now();
        left.max(Duration::zero())
    }
}

fn resolve_thresholds(attrs: &TimerAttributes, defaults: &ThresholdConfig) -> ThresholdConfig {
    ThresholdConfig {
        rush_for: threshold("rush_for", attrs.rush_for.as_ref(), defaults.rush_for),
        rush_for_critical: threshold(
            "rush_for_critical",
            attrs.rush_for_critical.as_ref(),
            defaults.rush_for_critical,
        ),
        late_for: threshold("late_for", attrs.late_for.as_ref(), defaults.late_for),
        late_for_critical: threshold(
            "late_for_critical",
            attrs.late_for_critical.as_ref(),
            defaults.late_for_critical,
        ),
    }
}

fn threshold(name: &str, value: Option<&AttributeValue>, default: f64) -> f64 {
    match value {
        None => default,
        Some(raw) => match raw.number() {
            Some(n) => n.max(0.0),
            None => {
                tracing::warn!(
                    attribute = name,
                    value = ?raw,
                    default,
                    "unreadable threshold, using default"
                );
                default
            }
        },
    }
}

/// Parse a start time.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` and `YYYY-MM-DDTHH:MM[:SS]` in
/// local time, and a bare `YYYY-MM-DD` (UTC midnight).
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const LOCAL_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
