//! Tracker state container.
//!
//! [`TrackerStore`] owns the clock, the task automaton, the session ledger,
//! the stats and the achievement book. Every mutation goes through it: it
//! stamps the operation with its [`TimeSource`], keeps the history counters,
//! re-evaluates achievements and hands the resulting events to subscribers
//! in registration order.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::achievement::{Achievement, AchievementBook, AchievementEvaluator, AggregateView};
use crate::clock::DistortionClock;
use crate::error::Rejection;
use crate::events::Event;
use crate::session::{FocusSession, FocusSessionLedger};
use crate::stats::ProductivityStats;
use crate::storage::Config;
use crate::task::{Completion, Procrastination, Task, TaskLifecycleAutomaton, TaskPatch};
use crate::time::{SystemClock, TimeSource};

pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&Event) + Send>;
type CompletionCallback = Box<dyn FnMut() + Send>;

/// Persisted tracker state.
///
/// The clock and any open focus session are deliberately absent: a restored
/// tracker always starts idle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub focus_sessions: Vec<FocusSession>,
    #[serde(default)]
    pub productivity_stats: ProductivityStats,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

pub struct TrackerStore {
    clock: DistortionClock,
    tasks: TaskLifecycleAutomaton,
    ledger: FocusSessionLedger,
    stats: ProductivityStats,
    achievements: AchievementBook,
    time: Arc<dyn TimeSource>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
    completion_callbacks: Vec<CompletionCallback>,
    default_duration: Duration,
}

impl TrackerStore {
    pub fn new(config: &Config) -> Self {
        Self::with_time_source(config, Arc::new(SystemClock))
    }

    pub fn with_time_source(config: &Config, time: Arc<dyn TimeSource>) -> Self {
        let default_duration = config.timer.default_duration();
        Self {
            clock: DistortionClock::with_curve(config.distortion.curve.clone(), default_duration),
            tasks: TaskLifecycleAutomaton::new(config.tasks.procrastination_step),
            ledger: FocusSessionLedger::new(),
            stats: ProductivityStats::default(),
            achievements: AchievementBook::default(),
            time,
            subscribers: Vec::new(),
            next_subscription: 1,
            completion_callbacks: Vec::new(),
            default_duration,
        }
    }

    /// Rebuild from a snapshot. The clock starts idle and no session is open.
    pub fn restore(snapshot: TrackerSnapshot, config: &Config) -> Self {
        Self::restore_with_time_source(snapshot, config, Arc::new(SystemClock))
    }

    pub fn restore_with_time_source(
        snapshot: TrackerSnapshot,
        config: &Config,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let mut store = Self::with_time_source(config, time);
        store.tasks =
            TaskLifecycleAutomaton::from_tasks(snapshot.tasks, config.tasks.procrastination_step);
        store.ledger = FocusSessionLedger::from_history(snapshot.focus_sessions);
        store.stats = snapshot.productivity_stats;
        store.achievements = AchievementBook::from_saved(snapshot.achievements);
        // Older saves may predate a rule.
        store.evaluate_achievements();
        info!(
            tasks = store.tasks.len(),
            sessions = store.ledger.history().len(),
            "tracker restored"
        );
        store
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            tasks: self.tasks.iter().cloned().collect(),
            focus_sessions: self.ledger.history().to_vec(),
            productivity_stats: self.stats.clone(),
            achievements: self.achievements.to_vec(),
        }
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    pub fn tasks(&self) -> &TaskLifecycleAutomaton {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn stats(&self) -> &ProductivityStats {
        &self.stats
    }

    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    /// Closed focus sessions, oldest first.
    pub fn sessions(&self) -> &[FocusSession] {
        self.ledger.history()
    }

    pub fn active_session(&self) -> Option<&FocusSession> {
        self.ledger.active()
    }

    pub fn clock(&self) -> &DistortionClock {
        &self.clock
    }

    /// Countdown length from the configuration.
    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + Send + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Register a callback run each time a countdown reaches zero.
    pub fn on_timer_complete(&mut self, callback: impl FnMut() + Send + 'static) {
        self.completion_callbacks.push(Box::new(callback));
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Add a pending task and return its id.
    pub fn add_task(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
        importance: i32,
        deadline: Option<DateTime<Utc>>,
    ) -> String {
        let at = self.now();
        let task = self.tasks.add(title, description, importance, deadline, at);
        let task_id = task.id.clone();
        let title = task.title.clone();
        self.stats.total_tasks_created += 1;

        self.emit(Event::TaskAdded {
            task_id: task_id.clone(),
            title,
            at,
        });
        self.evaluate_achievements();
        task_id
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<(), Rejection> {
        let at = self.now();
        self.tasks
            .update(id, patch, at)
            .map_err(|r| rejected("update_task", r))?;
        self.emit(Event::TaskUpdated {
            task_id: id.to_string(),
            at,
        });
        Ok(())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, Rejection> {
        let task = self.tasks.delete(id).map_err(|r| rejected("delete_task", r))?;
        let at = self.now();
        self.emit(Event::TaskDeleted {
            task_id: task.id.clone(),
            at,
        });
        Ok(task)
    }

    /// Complete a task. Completing it again is rejected and counts nothing.
    pub fn complete_task(&mut self, id: &str) -> Result<Completion, Rejection> {
        let at = self.now();
        let completion = self
            .tasks
            .complete(id, at)
            .map_err(|r| rejected("complete_task", r))?;

        self.stats.total_tasks_completed += 1;
        if completion.met_deadline {
            self.stats.deadline_finishes += 1;
        }

        self.emit(Event::TaskCompleted {
            task_id: id.to_string(),
            met_deadline: completion.met_deadline,
            at,
        });
        self.evaluate_achievements();
        Ok(completion)
    }

    pub fn procrastinate(&mut self, id: &str) -> Result<Procrastination, Rejection> {
        let at = self.now();
        let outcome = self
            .tasks
            .procrastinate(id, at)
            .map_err(|r| rejected("procrastinate", r))?;

        let event = match outcome {
            Procrastination::Raised { level } => Event::TaskProcrastinated {
                task_id: id.to_string(),
                level,
                at,
            },
            Procrastination::RanAway => {
                self.stats.total_tasks_fled += 1;
                Event::TaskRanAway {
                    task_id: id.to_string(),
                    at,
                }
            }
        };
        self.emit(event);
        self.evaluate_achievements();
        Ok(outcome)
    }

    // ── Focus sessions ───────────────────────────────────────────────

    /// Open a focus session on a task, moving it to in-progress.
    pub fn start_focus_session(&mut self, task_id: &str) -> Result<String, Rejection> {
        if self.ledger.active().is_some() {
            return Err(rejected("start_focus_session", Rejection::SessionAlreadyActive));
        }

        let at = self.now();
        let started = self
            .tasks
            .begin_work(task_id, at)
            .map_err(|r| rejected("start_focus_session", r))?;
        let session_id = self
            .ledger
            .start_session(task_id, at)
            .map_err(|r| rejected("start_focus_session", r))?
            .id
            .clone();
        self.sync_session_distortion();

        if started {
            self.emit(Event::TaskStarted {
                task_id: task_id.to_string(),
                at,
            });
        }
        self.emit(Event::SessionStarted {
            session_id: session_id.clone(),
            task_id: task_id.to_string(),
            at,
        });
        Ok(session_id)
    }

    /// Close the open session and bill its real duration to the task.
    pub fn end_focus_session(&mut self) -> Result<FocusSession, Rejection> {
        let at = self.now();
        let session = self
            .ledger
            .end_session(at, &mut self.stats)
            .map_err(|r| rejected("end_focus_session", r))?;

        if let Err(rejection) = self
            .tasks
            .record_work(&session.task_id, session.duration_secs, at)
        {
            // The task was deleted mid-session; the stats still count it.
            debug!(session_id = %session.id, %rejection, "session task not billed");
        }

        self.emit(Event::SessionEnded {
            session_id: session.id.clone(),
            task_id: session.task_id.clone(),
            duration_secs: session.duration_secs,
            distortion_level: session.distortion_level,
            at,
        });
        self.evaluate_achievements();
        Ok(session)
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Set the live distortion level and return the clamped value.
    pub fn set_distortion_level(&mut self, level: f64) -> f64 {
        let event = self.clock.set_distortion(level);
        let level = self.clock.distortion();
        self.sync_session_distortion();
        if let Some(event) = event {
            self.emit(event);
        }
        level
    }

    pub fn start_timer(&mut self, duration: Duration) -> bool {
        let event = self.clock.start(duration);
        self.emit_clock("start_timer", event)
    }

    pub fn pause_timer(&mut self) -> bool {
        let event = self.clock.pause();
        self.emit_clock("pause_timer", event)
    }

    pub fn resume_timer(&mut self) -> bool {
        let event = self.clock.resume();
        self.emit_clock("resume_timer", event)
    }

    /// Return the clock to idle. Distortion drops back to zero.
    pub fn reset_timer(&mut self, duration: Duration) -> bool {
        let event = self.clock.reset(duration);
        self.emit_clock("reset_timer", event)
    }

    pub fn enter_distortion(&mut self) -> bool {
        let event = self.clock.enter_distortion();
        self.emit_clock("enter_distortion", event)
    }

    pub fn exit_distortion(&mut self) -> bool {
        let event = self.clock.exit_distortion();
        self.emit_clock("exit_distortion", event)
    }

    /// Feed `dt` of real elapsed time to the clock.
    ///
    /// Returns `true` on the tick that completes the countdown. That tick
    /// runs the completion callbacks and closes the open focus session.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(event) = self.clock.tick(dt) else {
            return false;
        };
        self.emit(event);

        for callback in self.completion_callbacks.iter_mut() {
            callback();
        }
        if self.ledger.active().is_some() {
            // Cannot fail: a session is open.
            let _ = self.end_focus_session();
        }
        true
    }

    // ── Internals ────────────────────────────────────────────────────

    /// The open session records the level that is actually applied: the
    /// live level while the clock is distorted, 0 otherwise. Ticks do not
    /// sync, so a countdown that completes while distorted keeps its level.
    fn sync_session_distortion(&mut self) {
        self.ledger.set_distortion(self.clock.applied_distortion());
    }

    fn emit_clock(&mut self, operation: &'static str, event: Option<Event>) -> bool {
        self.sync_session_distortion();
        match event {
            Some(event) => {
                self.emit(event);
                true
            }
            None => {
                debug!(operation, state = ?self.clock.state(), "clock call ignored");
                false
            }
        }
    }

    fn emit(&mut self, event: Event) {
        debug!(kind = event.kind(), "event");
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event);
        }
    }

    fn evaluate_achievements(&mut self) {
        let view = AggregateView {
            tasks: &self.tasks,
            sessions: self.ledger.history(),
            stats: &self.stats,
        };
        let pending = AchievementEvaluator::pending_unlocks(&view, &self.achievements);
        if pending.is_empty() {
            return;
        }

        let at = self.now();
        for id in pending {
            if let Some(event) = self.achievements.unlock(id, at) {
                self.emit(event);
            }
        }
    }
}

fn rejected(operation: &'static str, rejection: Rejection) -> Rejection {
    warn!(operation, %rejection, "operation rejected");
    rejection
}
