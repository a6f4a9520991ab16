//! # Chronodrift Core Library
//!
//! This library provides the core logic for the Chronodrift task tracker: a
//! countdown whose speed follows a user-controlled distortion level, a task
//! lifecycle that punishes neglect, and one-shot achievements derived from
//! both. The `chronodrift` CLI is a thin host over the same library.
//!
//! ## Architecture
//!
//! - **Clock**: A delta-driven state machine. The caller measures real
//!   elapsed time and invokes `tick()`; the [`Ticker`] does this on a tokio
//!   interval
//! - **Tasks**: A lifecycle automaton with terminal completed and
//!   running-away states
//! - **Sessions**: Focus sessions billed in real time, with day streaks
//! - **Achievements**: Stateless rules evaluated after every mutation
//! - **Storage**: SQLite snapshot storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TrackerStore`]: Owns all state and serializes every mutation
//! - [`DistortionClock`]: Countdown with a distortion-scaled rate
//! - [`TaskLifecycleAutomaton`]: Task status transitions
//! - [`Database`]: Snapshot persistence
//! - [`Config`]: Application configuration management

pub mod achievement;
pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task;
pub mod time;

pub use achievement::{Achievement, AchievementBook, AchievementEvaluator, AchievementId};
pub use clock::{ClockState, CurveSegment, DistortionClock, DistortionCurve, SharedStore, Ticker};
pub use error::{ConfigError, CoreError, DatabaseError, Rejection};
pub use events::Event;
pub use session::{FocusSession, FocusSessionLedger};
pub use stats::ProductivityStats;
pub use storage::{Config, Database};
pub use store::{SubscriptionId, TrackerSnapshot, TrackerStore};
pub use task::{Task, TaskAction, TaskLifecycleAutomaton, TaskPatch, TaskStatus};
pub use time::{ManualTime, SystemClock, TimeSource};
