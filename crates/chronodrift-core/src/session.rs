//! Focus session ledger.
//!
//! Tracks the single active focus session and the history of closed ones.
//! Durations are billed in real wall-clock seconds between start and end,
//! whatever the distortion clock displayed in the meantime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::clamp_level;
use crate::error::Rejection;
use crate::stats::ProductivityStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    pub task_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Real seconds, fixed at close.
    pub duration_secs: u64,
    /// Distortion level in effect when the session closed.
    pub distortion_level: f64,
}

impl FocusSession {
    fn open(task_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            start_time: at,
            end_time: None,
            duration_secs: 0,
            distortion_level: 0.0,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FocusSessionLedger {
    active: Option<FocusSession>,
    history: Vec<FocusSession>,
}

impl FocusSessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from saved closed sessions. Open sessions are never restored.
    pub fn from_history(history: impl IntoIterator<Item = FocusSession>) -> Self {
        Self {
            active: None,
            history: history.into_iter().filter(FocusSession::is_closed).collect(),
        }
    }

    pub fn active(&self) -> Option<&FocusSession> {
        self.active.as_ref()
    }

    /// Closed sessions, oldest first.
    pub fn history(&self) -> &[FocusSession] {
        &self.history
    }

    /// Total billed seconds for one task across closed sessions.
    pub fn time_for_task(&self, task_id: &str) -> u64 {
        self.history
            .iter()
            .filter(|s| s.task_id == task_id)
            .map(|s| s.duration_secs)
            .sum()
    }

    pub fn start_session(&mut self, task_id: &str, at: DateTime<Utc>) -> Result<&FocusSession, Rejection> {
        if self.active.is_some() {
            return Err(Rejection::SessionAlreadyActive);
        }
        let session = FocusSession::open(task_id, at);
        info!(session_id = %session.id, task_id, "focus session started");
        Ok(self.active.insert(session))
    }

    /// Record the live distortion level on the open session.
    pub fn set_distortion(&mut self, level: f64) -> bool {
        match self.active.as_mut() {
            Some(session) => {
                session.distortion_level = clamp_level(level);
                true
            }
            None => false,
        }
    }

    /// Close the open session, bill its duration and update the streak.
    pub fn end_session(
        &mut self,
        at: DateTime<Utc>,
        stats: &mut ProductivityStats,
    ) -> Result<FocusSession, Rejection> {
        let mut session = self.active.take().ok_or(Rejection::NoActiveSession)?;

        session.end_time = Some(at);
        session.duration_secs = (at - session.start_time).num_seconds().max(0) as u64;

        stats.total_time_spent_secs = stats.total_time_spent_secs.saturating_add(session.duration_secs);
        stats.record_activity(at.date_naive());

        info!(
            session_id = %session.id,
            duration_secs = session.duration_secs,
            distortion = session.distortion_level,
            "focus session ended"
        );
        self.history.push(session.clone());
        Ok(session)
    }
}
