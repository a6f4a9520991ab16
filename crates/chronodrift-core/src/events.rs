use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievement::AchievementId;
use crate::clock::ClockState;

/// Every state change in the tracker produces an Event.
/// Subscribers of the store receive them in order; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. Emitted once per countdown.
    TimerCompleted {
        at: DateTime<Utc>,
    },
    DistortionEntered {
        level: f64,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    DistortionExited {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    DistortionChanged {
        level: f64,
        multiplier: f64,
        at: DateTime<Utc>,
    },
    ClockSnapshot {
        state: ClockState,
        remaining_ms: u64,
        initial_ms: u64,
        distortion: f64,
        multiplier: f64,
        at: DateTime<Utc>,
    },
    TaskAdded {
        task_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    TaskUpdated {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    /// Task moved from pending to in-progress.
    TaskStarted {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        /// Finished inside the window right before the deadline.
        met_deadline: bool,
        at: DateTime<Utc>,
    },
    TaskProcrastinated {
        task_id: String,
        level: u8,
        at: DateTime<Utc>,
    },
    /// Procrastination pushed the task into the terminal running-away state.
    TaskRanAway {
        task_id: String,
        at: DateTime<Utc>,
    },
    SessionStarted {
        session_id: String,
        task_id: String,
        at: DateTime<Utc>,
    },
    SessionEnded {
        session_id: String,
        task_id: String,
        duration_secs: u64,
        distortion_level: f64,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        id: AchievementId,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerResumed { .. } => "timer_resumed",
            Event::TimerReset { .. } => "timer_reset",
            Event::TimerCompleted { .. } => "timer_completed",
            Event::DistortionEntered { .. } => "distortion_entered",
            Event::DistortionExited { .. } => "distortion_exited",
            Event::DistortionChanged { .. } => "distortion_changed",
            Event::ClockSnapshot { .. } => "clock_snapshot",
            Event::TaskAdded { .. } => "task_added",
            Event::TaskUpdated { .. } => "task_updated",
            Event::TaskDeleted { .. } => "task_deleted",
            Event::TaskStarted { .. } => "task_started",
            Event::TaskCompleted { .. } => "task_completed",
            Event::TaskProcrastinated { .. } => "task_procrastinated",
            Event::TaskRanAway { .. } => "task_ran_away",
            Event::SessionStarted { .. } => "session_started",
            Event::SessionEnded { .. } => "session_ended",
            Event::AchievementUnlocked { .. } => "achievement_unlocked",
        }
    }
}
