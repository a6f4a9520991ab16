//! Distortion clock implementation.
//!
//! The clock is a delta-driven countdown. It does not read the wall clock or
//! spawn threads: the caller measures elapsed real time and hands it to
//! `tick()`. While `Distorted`, the real delta is scaled by the distortion
//! curve before it is applied, and the countdown may run backward.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Distorted | Completed)
//! Paused -> Running
//! Distorted -> (Running | Paused | Completed)
//! any --reset--> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut clock = DistortionClock::new(Duration::from_secs(600));
//! clock.start(Duration::from_secs(600));
//! // In a loop:
//! clock.tick(elapsed); // Returns Some(Event::TimerCompleted) once
//! ```

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::curve::{clamp_level, DistortionCurve, MIN_DISTORTION};
use crate::events::Event;

/// Rate applied while the clock is `Running` without distortion.
pub const REAL_RATE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    /// Running with the distortion curve applied.
    Distorted,
    /// Countdown reached zero. Only `reset` leaves this state.
    Completed,
}

impl ClockState {
    /// States in which `tick` consumes time.
    pub fn is_ticking(self) -> bool {
        matches!(self, ClockState::Running | ClockState::Distorted)
    }
}

/// Countdown with a distortion-controlled rate.
#[derive(Debug, Clone)]
pub struct DistortionClock {
    curve: DistortionCurve,
    state: ClockState,
    /// Configured duration of the current countdown. Upper bound for
    /// `remaining` when time runs backward.
    initial: Duration,
    remaining: Duration,
    distortion: f64,
}

impl DistortionClock {
    /// Create an idle clock with the default curve.
    pub fn new(duration: Duration) -> Self {
        Self::with_curve(DistortionCurve::default(), duration)
    }

    pub fn with_curve(curve: DistortionCurve, duration: Duration) -> Self {
        Self {
            curve,
            state: ClockState::Idle,
            initial: duration,
            remaining: duration,
            distortion: 0.0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn remaining_ms(&self) -> u64 {
        millis(self.remaining)
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    pub fn distortion(&self) -> f64 {
        self.distortion
    }

    pub fn curve(&self) -> &DistortionCurve {
        &self.curve
    }

    /// Distortion level currently shaping the rate; 0 unless `Distorted`.
    pub fn applied_distortion(&self) -> f64 {
        match self.state {
            ClockState::Distorted => self.distortion,
            _ => MIN_DISTORTION,
        }
    }

    /// Multiplier the next tick would apply.
    pub fn current_multiplier(&self) -> f64 {
        match self.state {
            ClockState::Distorted => self.curve.multiplier(self.distortion),
            _ => REAL_RATE,
        }
    }

    /// 0.0 .. 1.0 progress through the countdown.
    pub fn progress(&self) -> f64 {
        if self.initial.is_zero() {
            return 0.0;
        }
        1.0 - (self.remaining.as_secs_f64() / self.initial.as_secs_f64())
    }

    pub fn snapshot(&self) -> Event {
        Event::ClockSnapshot {
            state: self.state,
            remaining_ms: self.remaining_ms(),
            initial_ms: millis(self.initial),
            distortion: self.distortion,
            multiplier: self.current_multiplier(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, duration: Duration) -> Option<Event> {
        if self.state != ClockState::Idle {
            debug!(state = ?self.state, "start ignored: clock not idle");
            return None;
        }
        self.initial = duration;
        self.remaining = duration;
        self.state = ClockState::Running;
        info!(duration_ms = millis(duration), "clock started");
        Some(Event::TimerStarted {
            duration_ms: millis(duration),
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_ticking() {
            debug!(state = ?self.state, "pause ignored");
            return None;
        }
        self.state = ClockState::Paused;
        Some(Event::TimerPaused {
            remaining_ms: self.remaining_ms(),
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != ClockState::Paused {
            debug!(state = ?self.state, "resume ignored");
            return None;
        }
        self.state = ClockState::Running;
        Some(Event::TimerResumed {
            remaining_ms: self.remaining_ms(),
            at: Utc::now(),
        })
    }

    /// Return to `Idle` from any state with a fresh countdown.
    pub fn reset(&mut self, duration: Duration) -> Option<Event> {
        self.state = ClockState::Idle;
        self.initial = duration;
        self.remaining = duration;
        self.distortion = 0.0;
        Some(Event::TimerReset {
            duration_ms: millis(duration),
            at: Utc::now(),
        })
    }

    pub fn enter_distortion(&mut self) -> Option<Event> {
        if self.state != ClockState::Running {
            debug!(state = ?self.state, "enter_distortion ignored");
            return None;
        }
        self.state = ClockState::Distorted;
        Some(Event::DistortionEntered {
            level: self.distortion,
            remaining_ms: self.remaining_ms(),
            at: Utc::now(),
        })
    }

    pub fn exit_distortion(&mut self) -> Option<Event> {
        if self.state != ClockState::Distorted {
            debug!(state = ?self.state, "exit_distortion ignored");
            return None;
        }
        self.state = ClockState::Running;
        Some(Event::DistortionExited {
            remaining_ms: self.remaining_ms(),
            at: Utc::now(),
        })
    }

    /// Store a clamped distortion level. It only changes the rate while
    /// the clock is `Distorted`.
    pub fn set_distortion(&mut self, level: f64) -> Option<Event> {
        let level = clamp_level(level);
        self.distortion = level;
        Some(Event::DistortionChanged {
            level,
            multiplier: self.curve.multiplier(level),
            at: Utc::now(),
        })
    }

    /// Apply `dt` of real elapsed time. Returns `Some(Event::TimerCompleted)`
    /// on the tick that drains the countdown.
    pub fn tick(&mut self, dt: Duration) -> Option<Event> {
        if !self.state.is_ticking() || dt.is_zero() {
            return None;
        }

        let multiplier = self.current_multiplier();
        let virtual_dt = scale(dt, multiplier.abs());

        if multiplier < 0.0 {
            self.remaining = self.remaining.saturating_add(virtual_dt).min(self.initial);
            return None;
        }

        self.remaining = self.remaining.saturating_sub(virtual_dt);
        if self.remaining.is_zero() {
            self.state = ClockState::Completed;
            info!("clock completed");
            return Some(Event::TimerCompleted { at: Utc::now() });
        }
        None
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn scale(dt: Duration, factor: f64) -> Duration {
    if factor == 1.0 {
        return dt;
    }
    Duration::try_from_secs_f64(dt.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_MIN: Duration = Duration::from_secs(600);

    fn running(duration: Duration) -> DistortionClock {
        let mut clock = DistortionClock::new(duration);
        clock.start(duration);
        clock
    }

    #[test]
    fn start_pause_resume() {
        let mut clock = DistortionClock::new(TEN_MIN);
        assert_eq!(clock.state(), ClockState::Idle);

        assert!(clock.start(TEN_MIN).is_some());
        assert_eq!(clock.state(), ClockState::Running);
        assert!(clock.start(TEN_MIN).is_none());

        assert!(clock.pause().is_some());
        assert_eq!(clock.state(), ClockState::Paused);

        assert!(clock.resume().is_some());
        assert_eq!(clock.state(), ClockState::Running);
    }

    #[test]
    fn tick_zero_is_inert() {
        let mut clock = running(TEN_MIN);
        assert!(clock.tick(Duration::ZERO).is_none());
        assert_eq!(clock.remaining(), TEN_MIN);
        assert_eq!(clock.state(), ClockState::Running);

        let mut instant = running(Duration::ZERO);
        assert!(instant.tick(Duration::ZERO).is_none());
        assert_eq!(instant.state(), ClockState::Running);
    }

    #[test]
    fn real_rate_drains_to_exact_zero_once() {
        let mut clock = running(TEN_MIN);
        let mut completions = 0;
        for _ in 0..600 {
            if clock.tick(Duration::from_secs(1)).is_some() {
                completions += 1;
            }
        }
        assert_eq!(clock.remaining(), Duration::ZERO);
        assert_eq!(clock.state(), ClockState::Completed);

        for _ in 0..10 {
            if clock.tick(Duration::from_secs(1)).is_some() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[test]
    fn tick_result_does_not_depend_on_granularity() {
        let mut coarse = running(TEN_MIN);
        coarse.enter_distortion();
        coarse.set_distortion(45.0);
        coarse.tick(Duration::from_secs(60));

        let mut fine = running(TEN_MIN);
        fine.enter_distortion();
        fine.set_distortion(45.0);
        for _ in 0..600 {
            fine.tick(Duration::from_millis(100));
        }

        let diff = coarse.remaining().as_secs_f64() - fine.remaining().as_secs_f64();
        assert!(diff.abs() < 1e-3);
        assert_eq!(coarse.remaining(), Duration::from_secs(510));
    }

    #[test]
    fn distortion_scales_only_while_distorted() {
        let mut clock = running(TEN_MIN);
        clock.set_distortion(60.0);
        clock.tick(Duration::from_secs(10));
        assert_eq!(clock.remaining(), Duration::from_secs(590));

        clock.enter_distortion();
        assert_eq!(clock.current_multiplier(), 2.0);
        clock.tick(Duration::from_secs(10));
        assert_eq!(clock.remaining(), Duration::from_secs(570));

        clock.exit_distortion();
        assert_eq!(clock.state(), ClockState::Running);
        clock.tick(Duration::from_secs(10));
        assert_eq!(clock.remaining(), Duration::from_secs(560));
    }

    #[test]
    fn reverse_time_refills_up_to_initial() {
        let mut clock = running(TEN_MIN);
        clock.tick(Duration::from_secs(60));
        clock.enter_distortion();
        clock.set_distortion(96.0);

        clock.tick(Duration::from_secs(10));
        assert_eq!(clock.remaining(), Duration::from_secs(550));

        clock.tick(Duration::from_secs(3600));
        assert_eq!(clock.remaining(), TEN_MIN);
        assert_eq!(clock.state(), ClockState::Distorted);
    }

    #[test]
    fn distorted_clock_can_complete() {
        let mut clock = running(Duration::from_secs(30));
        clock.enter_distortion();
        clock.set_distortion(90.0);
        let event = clock.tick(Duration::from_secs(10));
        assert!(matches!(event, Some(Event::TimerCompleted { .. })));
        assert_eq!(clock.state(), ClockState::Completed);
    }

    #[test]
    fn paused_and_idle_ignore_ticks() {
        let mut clock = DistortionClock::new(TEN_MIN);
        assert!(clock.tick(Duration::from_secs(5)).is_none());
        assert_eq!(clock.remaining(), TEN_MIN);

        clock.start(TEN_MIN);
        clock.enter_distortion();
        clock.pause();
        clock.tick(Duration::from_secs(5));
        assert_eq!(clock.remaining(), TEN_MIN);
        assert!(clock.enter_distortion().is_none());
    }

    #[test]
    fn reset_clears_distortion_from_any_state() {
        let mut clock = running(TEN_MIN);
        clock.enter_distortion();
        clock.set_distortion(99.0);
        assert!(clock.reset(Duration::from_secs(120)).is_some());
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(clock.remaining(), Duration::from_secs(120));
        assert_eq!(clock.distortion(), 0.0);
    }

    #[test]
    fn set_distortion_clamps() {
        let mut clock = DistortionClock::new(TEN_MIN);
        clock.set_distortion(140.0);
        assert_eq!(clock.distortion(), 100.0);
        clock.set_distortion(-3.0);
        assert_eq!(clock.distortion(), 0.0);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let clock = DistortionClock::new(TEN_MIN);
        match clock.snapshot() {
            Event::ClockSnapshot {
                state,
                remaining_ms,
                multiplier,
                ..
            } => {
                assert_eq!(state, ClockState::Idle);
                assert_eq!(remaining_ms, 600_000);
                assert_eq!(multiplier, 1.0);
            }
            _ => panic!("Expected ClockSnapshot"),
        }
    }

    #[test]
    fn progress_tracks_drain_and_refill() {
        let mut clock = running(Duration::from_secs(100));
        assert_eq!(clock.progress(), 0.0);
        clock.tick(Duration::from_secs(25));
        assert!((clock.progress() - 0.25).abs() < 1e-9);

        clock.set_distortion(100.0);
        clock.enter_distortion();
        clock.tick(Duration::from_secs(10));
        assert!((clock.progress() - 0.15).abs() < 1e-9);

        assert_eq!(DistortionClock::new(Duration::ZERO).progress(), 0.0);
    }

    #[test]
    fn applied_distortion_only_while_distorted() {
        let mut clock = running(TEN_MIN);
        clock.set_distortion(80.0);
        assert_eq!(clock.applied_distortion(), 0.0);
        clock.enter_distortion();
        assert_eq!(clock.applied_distortion(), 80.0);
        clock.pause();
        assert_eq!(clock.applied_distortion(), 0.0);
        assert_eq!(clock.distortion(), 80.0);
    }

    #[test]
    fn huge_durations_saturate_millis() {
        let clock = DistortionClock::new(Duration::MAX);
        assert_eq!(clock.remaining_ms(), u64::MAX);
    }

}
