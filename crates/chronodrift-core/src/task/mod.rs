//! Task model and lifecycle states.
//!
//! ```text
//!   PENDING ───start───> IN-PROGRESS
//!      │                     │
//!      ├──────complete───────┼──────> COMPLETED      (terminal)
//!      │                     │
//!      └───procrastinate x N─┴──────> RUNNING-AWAY   (terminal)
//! ```
//!
//! Procrastination accumulates in fixed steps; the step that would reach
//! 100 sends the task running away instead of clamping.

mod automaton;

pub use automaton::{Completion, Procrastination, TaskLifecycleAutomaton};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_IMPORTANCE: u8 = 1;
pub const MAX_IMPORTANCE: u8 = 5;
pub const MAX_PROCRASTINATION: u8 = 100;
pub const DEFAULT_PROCRASTINATION_STEP: u8 = 20;

/// A completion counts as a deadline finish when it lands at most this many
/// seconds before the deadline.
pub const DEADLINE_WINDOW_SECS: i64 = 600;

/// Clamp user input into the importance scale.
pub fn clamp_importance(value: i32) -> u8 {
    value.clamp(MIN_IMPORTANCE as i32, MAX_IMPORTANCE as i32) as u8
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    /// Fled after too much procrastination.
    RunningAway,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::RunningAway)
    }

    /// Check whether an action may be applied in this status.
    pub fn allows(&self, action: TaskAction) -> bool {
        self.available_actions().contains(&action)
    }

    /// Actions that are legal from this status.
    pub fn available_actions(&self) -> &'static [TaskAction] {
        match self {
            TaskStatus::Pending => &[
                TaskAction::Start,
                TaskAction::Complete,
                TaskAction::Procrastinate,
                TaskAction::Update,
            ],
            TaskStatus::InProgress => &[
                TaskAction::Complete,
                TaskAction::Procrastinate,
                TaskAction::Update,
            ],
            TaskStatus::Completed | TaskStatus::RunningAway => &[],
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::RunningAway => write!(f, "running-away"),
        }
    }
}

/// User-facing operation on a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    /// Begin work: PENDING → IN-PROGRESS
    Start,
    /// Finish: PENDING | IN-PROGRESS → COMPLETED
    Complete,
    /// Put it off: level += step, → RUNNING-AWAY at 100
    Procrastinate,
    /// Edit mutable fields
    Update,
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskAction::Start => write!(f, "start"),
            TaskAction::Complete => write!(f, "complete"),
            TaskAction::Procrastinate => write!(f, "procrastinate"),
            TaskAction::Update => write!(f, "update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// 1 (trivial) ..= 5 (critical)
    pub importance: u8,
    pub deadline: Option<DateTime<Utc>>,
    /// 0 ..= 100, never decreases
    pub procrastination_level: u8,
    /// Accumulated real seconds from closed focus sessions
    pub time_spent_secs: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_worked_on: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a pending task with default values.
    pub fn new(title: impl Into<String>, at: DateTime<Utc>) -> Self {
        Task {
            id: format!("task-{}-{}", at.timestamp(), uuid::Uuid::new_v4()),
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            importance: 3,
            deadline: None,
            procrastination_level: 0,
            time_spent_secs: 0,
            created_at: at,
            updated_at: at,
            completed_at: None,
            last_worked_on: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Completed no earlier than [`DEADLINE_WINDOW_SECS`] before the
    /// deadline and not after it.
    pub fn finished_near_deadline(&self) -> bool {
        match (self.completed_at, self.deadline) {
            (Some(done), Some(deadline)) => {
                let lead = deadline - done;
                lead >= Duration::zero() && lead <= Duration::seconds(DEADLINE_WINDOW_SECS)
            }
            _ => false,
        }
    }
}

/// Partial update for the mutable fields of a task.
///
/// `None` leaves a field untouched. For optional fields the inner option
/// distinguishes "set" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub importance: Option<i32>,
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.importance.is_none()
            && self.deadline.is_none()
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(importance) = self.importance {
            task.importance = clamp_importance(importance);
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
    }
}
