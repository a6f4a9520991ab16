//! Piecewise-linear distortion curve.
//!
//! Maps a distortion level in `[0, 100]` to a time multiplier. Positive
//! multipliers drain the countdown faster or slower than real time, negative
//! ones refill it. The default curve is:
//!
//! ```text
//!   [0, 30)    0.5 -> 1.0   slowed
//!   [30, 60)   1.0 -> 2.0   accelerated
//!   [60, 80)   2.0 -> 3.0   sharply accelerated
//!   [80, 95)   3.0 -> 5.0   extreme
//!   [95, 100] -1.0          backward at real rate
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MIN_DISTORTION: f64 = 0.0;
pub const MAX_DISTORTION: f64 = 100.0;

/// Clamp a raw distortion value into `[0, 100]`. NaN becomes 0.
pub fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        return MIN_DISTORTION;
    }
    level.clamp(MIN_DISTORTION, MAX_DISTORTION)
}

/// One linear piece of the curve, covering `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    pub from: f64,
    pub to: f64,
    pub start_rate: f64,
    pub end_rate: f64,
}

impl CurveSegment {
    pub const fn new(from: f64, to: f64, start_rate: f64, end_rate: f64) -> Self {
        Self {
            from,
            to,
            start_rate,
            end_rate,
        }
    }

    pub const fn constant(from: f64, to: f64, rate: f64) -> Self {
        Self::new(from, to, rate, rate)
    }

    fn rate_at(&self, level: f64) -> f64 {
        if self.start_rate == self.end_rate {
            return self.start_rate;
        }
        let t = (level - self.from) / (self.to - self.from);
        self.start_rate + t * (self.end_rate - self.start_rate)
    }
}

/// Validated multiplier curve.
///
/// Segments are sorted, contiguous and cover exactly `[0, 100]`; the last
/// segment includes its upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurveSegment>", into = "Vec<CurveSegment>")]
pub struct DistortionCurve {
    segments: Vec<CurveSegment>,
}

impl DistortionCurve {
    pub fn new(segments: Vec<CurveSegment>) -> Result<Self, ConfigError> {
        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ConfigError::InvalidCurve("curve has no segments".into())),
        };
        if first.from != MIN_DISTORTION || last.to != MAX_DISTORTION {
            return Err(ConfigError::InvalidCurve(format!(
                "curve must span [0, 100], got [{}, {}]",
                first.from, last.to
            )));
        }
        for seg in &segments {
            if !(seg.from < seg.to) {
                return Err(ConfigError::InvalidCurve(format!(
                    "segment [{}, {}) is empty",
                    seg.from, seg.to
                )));
            }
            if !seg.start_rate.is_finite() || !seg.end_rate.is_finite() {
                return Err(ConfigError::InvalidCurve(format!(
                    "segment [{}, {}) has a non-finite rate",
                    seg.from, seg.to
                )));
            }
        }
        for pair in segments.windows(2) {
            if pair[0].to != pair[1].from {
                return Err(ConfigError::InvalidCurve(format!(
                    "gap or overlap between {} and {}",
                    pair[0].to, pair[1].from
                )));
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// Multiplier for a distortion level. Out-of-range input is clamped.
    pub fn multiplier(&self, level: f64) -> f64 {
        let level = clamp_level(level);
        let segment = self
            .segments
            .iter()
            .find(|s| level >= s.from && level < s.to)
            .or_else(|| self.segments.last());
        segment.map(|s| s.rate_at(level)).unwrap_or(1.0)
    }
}

impl Default for DistortionCurve {
    fn default() -> Self {
        Self {
            segments: vec![
                CurveSegment::new(0.0, 30.0, 0.5, 1.0),
                CurveSegment::new(30.0, 60.0, 1.0, 2.0),
                CurveSegment::new(60.0, 80.0, 2.0, 3.0),
                CurveSegment::new(80.0, 95.0, 3.0, 5.0),
                CurveSegment::constant(95.0, 100.0, -1.0),
            ],
        }
    }
}

impl TryFrom<Vec<CurveSegment>> for DistortionCurve {
    type Error = ConfigError;

    fn try_from(segments: Vec<CurveSegment>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<DistortionCurve> for Vec<CurveSegment> {
    fn from(curve: DistortionCurve) -> Self {
        curve.segments
    }
}
