//! Relative pace evaluation for the presentation timer.
//!
//! Compares how much of the talk's time has elapsed against how many slides
//! have been covered, and produces the warning bands the timer meter uses.
//! Pure functions only; called once per frame.

use serde::{Deserialize, Serialize};

/// Default band offset (percent) above the slide anchor for the rush warning
pub const DEFAULT_RUSH_FOR: f64 = 30.0;
/// Default band offset (percent) above the slide anchor for the critical rush warning
pub const DEFAULT_RUSH_FOR_CRITICAL: f64 = 50.0;
/// Default band offset (percent) below the slide anchor for the late warning
pub const DEFAULT_LATE_FOR: f64 = 10.0;
/// Default band offset (percent) below the slide anchor for the critical late warning
pub const DEFAULT_LATE_FOR_CRITICAL: f64 = 20.0;

/// One evaluation input: both values are percentages in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    pub slides_percent: f64,
    pub time_percent: f64,
}

impl ProgressSample {
    pub fn new(slides_percent: f64, time_percent: f64) -> Self {
        Self {
            slides_percent,
            time_percent,
        }
    }
}

/// Band offsets, fixed when the timer is configured.
///
/// `rush_for_critical >= rush_for` and `late_for_critical >= late_for` keep the
/// bands monotonic. Not enforced; the evaluator clamps either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_rush_for")]
    pub rush_for: f64,
    #[serde(default = "default_rush_for_critical")]
    pub rush_for_critical: f64,
    #[serde(default = "default_late_for")]
    pub late_for: f64,
    #[serde(default = "default_late_for_critical")]
    pub late_for_critical: f64,
}

fn default_rush_for() -> f64 {
    DEFAULT_RUSH_FOR
}

fn default_rush_for_critical() -> f64 {
    DEFAULT_RUSH_FOR_CRITICAL
}

fn default_late_for() -> f64 {
    DEFAULT_LATE_FOR
}

fn default_late_for_critical() -> f64 {
    DEFAULT_LATE_FOR_CRITICAL
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            rush_for: DEFAULT_RUSH_FOR,
            rush_for_critical: DEFAULT_RUSH_FOR_CRITICAL,
            late_for: DEFAULT_LATE_FOR,
            late_for_critical: DEFAULT_LATE_FOR_CRITICAL,
        }
    }
}

impl ThresholdConfig {
    /// Copy with NaN and negative offsets replaced by 0
    pub fn sanitized(&self) -> Self {
        let fix = |v: f64| if v.is_nan() { 0.0 } else { v.max(0.0) };
        Self {
            rush_for: fix(self.rush_for),
            rush_for_critical: fix(self.rush_for_critical),
            late_for: fix(self.late_for),
            late_for_critical: fix(self.late_for_critical),
        }
    }
}

/// Which side of the anchor the band was pushed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    /// Time is outpacing the slides; band sits above the anchor
    Rush,
    /// Slides are keeping up or ahead; band sits below the anchor
    Late,
}

/// Gauge thresholds. All values in [0, 100] with `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeBand {
    pub low: f64,
    pub high: f64,
    pub optimum: f64,
}

/// Evaluate the warning band for one sample.
///
/// Never fails: out-of-range input is clamped rather than rejected.
pub fn evaluate(sample: ProgressSample, config: &ThresholdConfig) -> GaugeBand {
    let sample = ProgressSample::new(
        nan_to_zero(sample.slides_percent),
        nan_to_zero(sample.time_percent),
    );
    let config = config.sanitized();
    match pace(sample) {
        Pace::Rush => rush_band(sample.slides_percent, &config),
        Pace::Late => late_band(sample.slides_percent, &config),
    }
}

/// Rush when time has elapsed faster than the slides were covered
pub fn pace(sample: ProgressSample) -> Pace {
    if sample.time_percent > sample.slides_percent {
        Pace::Rush
    } else {
        Pace::Late
    }
}

fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

fn rush_band(slides_percent: f64, config: &ThresholdConfig) -> GaugeBand {
    // high first so low can never exceed it
    let high = (slides_percent + config.rush_for_critical).clamp(0.0, 100.0);
    let low = (slides_percent + config.rush_for).clamp(0.0, high);
    GaugeBand {
        low,
        high,
        optimum: slides_percent.clamp(0.0, 100.0),
    }
}

fn late_band(slides_percent: f64, config: &ThresholdConfig) -> GaugeBand {
    let low = (slides_percent - config.late_for_critical).clamp(0.0, 100.0);
    let high = (slides_percent - config.late_for).clamp(low, 100.0);
    GaugeBand {
        low,
        high,
        optimum: slides_percent.clamp(0.0, 100.0),
    }
}
