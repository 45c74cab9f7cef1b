//! Timer meter state (rendering-agnostic)
//!
//! Mirrors the attributes of a gauge: a value on a 0..100 scale plus the
//! `low`/`high`/`optimum` thresholds. Frontends read this to pick colors.

use crate::core::progress::GaugeBand;

pub const METER_MIN: f64 = 0.0;
pub const METER_MAX: f64 = 100.0;

/// Threshold writes smaller than this are skipped
const CHANGE_EPSILON: f64 = 1.0;

/// Region the current value falls into, relative to the optimum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterLevel {
    Optimum,
    Suboptimum,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterState {
    pub value: f64,
    pub low: f64,
    pub high: f64,
    pub optimum: f64,
}

impl MeterState {
    pub fn new() -> Self {
        Self {
            value: 50.0,
            low: 33.0,
            high: 66.0,
            optimum: 0.0,
        }
    }

    pub fn set_value(&mut self, percent: f64) {
        self.value = if percent.is_nan() {
            METER_MIN
        } else {
            percent.clamp(METER_MIN, METER_MAX)
        };
    }

    /// Write a band onto the thresholds.
    ///
    /// Each threshold is only updated when it moves by more than one point.
    /// Returns true if anything changed.
    pub fn apply_band(&mut self, band: GaugeBand) -> bool {
        let mut changed = false;
        changed |= write_if_moved(&mut self.optimum, band.optimum);
        changed |= write_if_moved(&mut self.low, band.low);
        changed |= write_if_moved(&mut self.high, band.high);
        if changed {
            tracing::trace!(
                low = self.low,
                high = self.high,
                optimum = self.optimum,
                "meter thresholds updated"
            );
        }
        changed
    }

    pub fn level(&self) -> MeterLevel {
        let in_band = self.value >= self.low && self.value <= self.high;
        if self.optimum < self.low {
            if self.value < self.low {
                MeterLevel::Optimum
            } else if in_band {
                MeterLevel::Suboptimum
            } else {
                MeterLevel::Critical
            }
        } else if self.optimum > self.high {
            if self.value > self.high {
                MeterLevel::Optimum
            } else if in_band {
                MeterLevel::Suboptimum
            } else {
                MeterLevel::Critical
            }
        } else if in_band {
            MeterLevel::Optimum
        } else {
            MeterLevel::Suboptimum
        }
    }

    /// Value as a 0.0..=1.0 ratio
    pub fn ratio(&self) -> f64 {
        (self.value - METER_MIN) / (METER_MAX - METER_MIN)
    }
}

impl Default for MeterState {
    fn default() -> Self {
        Self::new()
    }
}

fn write_if_moved(slot: &mut f64, next: f64) -> bool {
    if (*slot - next).abs() > CHANGE_EPSILON {
        *slot = next;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter(value: f64, low: f64, high: f64, optimum: f64) -> MeterState {
        MeterState {
            value,
            low,
            high,
            optimum,
        }
    }

    #[test]
    fn test_initial_meter() {
        let m = MeterState::new();
        assert_eq!(m.value, 50.0);
        assert_eq!(m.low, 33.0);
        assert_eq!(m.high, 66.0);
        assert_eq!(m.optimum, 0.0);
    }

    #[test]
    fn test_apply_band_skips_small_moves() {
        let mut m = meter(0.0, 70.0, 90.0, 40.0);
        let changed = m.apply_band(GaugeBand {
            low: 71.0,
            high: 89.5,
            optimum: 41.0,
        });
        assert!(!changed);
        assert_eq!(m.low, 70.0);
        assert_eq!(m.high, 90.0);
        assert_eq!(m.optimum, 40.0);

        let changed = m.apply_band(GaugeBand {
            low: 72.0,
            high: 90.0,
            optimum: 40.0,
        });
        assert!(changed);
        assert_eq!(m.low, 72.0);
    }

    #[test]
    fn test_set_value_clamps() {
        let mut m = MeterState::new();
        m.set_value(140.0);
        assert_eq!(m.value, 100.0);
        m.set_value(-3.0);
        assert_eq!(m.value, 0.0);
        m.set_value(f64::NAN);
        assert_eq!(m.value, 0.0);
    }

    #[test]
    fn test_level_with_rush_band() {
        // optimum below low: small values are good
        assert_eq!(meter(50.0, 70.0, 90.0, 40.0).level(), MeterLevel::Optimum);
        assert_eq!(meter(75.0, 70.0, 90.0, 40.0).level(), MeterLevel::Suboptimum);
        assert_eq!(meter(95.0, 70.0, 90.0, 40.0).level(), MeterLevel::Critical);
    }

    #[test]
    fn test_level_with_late_band() {
        // optimum above high: large values are good
        assert_eq!(meter(75.0, 60.0, 70.0, 80.0).level(), MeterLevel::Optimum);
        assert_eq!(meter(65.0, 60.0, 70.0, 80.0).level(), MeterLevel::Suboptimum);
        assert_eq!(meter(30.0, 60.0, 70.0, 80.0).level(), MeterLevel::Critical);
    }

    #[test]
    fn test_level_with_optimum_inside_band() {
        assert_eq!(meter(50.0, 33.0, 66.0, 50.0).level(), MeterLevel::Optimum);
        assert_eq!(meter(10.0, 33.0, 66.0, 50.0).level(), MeterLevel::Suboptimum);
        assert_eq!(meter(90.0, 33.0, 66.0, 50.0).level(), MeterLevel::Suboptimum);
    }
}
