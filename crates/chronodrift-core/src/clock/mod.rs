mod curve;
mod engine;
mod ticker;

pub use curve::{clamp_level, CurveSegment, DistortionCurve, MAX_DISTORTION, MIN_DISTORTION};
pub use engine::{ClockState, DistortionClock, REAL_RATE};
pub use ticker::{SharedStore, Ticker};
