//! Task lifecycle automaton.
//!
//! Owns every task and is the only place a task's status changes. Terminal
//! tasks (completed, running-away) accept no further transitions or edits;
//! anything rejected leaves the task untouched.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, info};

use super::{
    clamp_importance, Task, TaskAction, TaskPatch, TaskStatus, DEFAULT_PROCRASTINATION_STEP,
    MAX_PROCRASTINATION,
};
use crate::error::Rejection;

/// Result of a first-time completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub met_deadline: bool,
}

/// Result of a procrastinate call that changed the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procrastination {
    /// Level went up but stayed below the limit.
    Raised { level: u8 },
    /// The step reached the limit; the task is gone for good.
    RanAway,
}

#[derive(Debug, Clone)]
pub struct TaskLifecycleAutomaton {
    tasks: IndexMap<String, Task>,
    procrastination_step: u8,
}

impl Default for TaskLifecycleAutomaton {
    fn default() -> Self {
        Self::new(DEFAULT_PROCRASTINATION_STEP)
    }
}

impl TaskLifecycleAutomaton {
    pub fn new(procrastination_step: u8) -> Self {
        Self {
            tasks: IndexMap::new(),
            procrastination_step: procrastination_step.clamp(1, MAX_PROCRASTINATION),
        }
    }

    /// Rebuild from previously saved tasks, keeping their order.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>, procrastination_step: u8) -> Self {
        let mut automaton = Self::new(procrastination_step);
        automaton.tasks = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        automaton
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Tasks in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn count_by_status(&self, status: TaskStatus) -> usize {
        self.tasks.values().filter(|t| t.status == status).count()
    }

    pub fn procrastination_step(&self) -> u8 {
        self.procrastination_step
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
        importance: i32,
        deadline: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> &Task {
        let mut task = Task::new(title, at);
        task.description = description;
        task.importance = clamp_importance(importance);
        task.deadline = deadline;
        info!(task_id = %task.id, "task added");
        let id = task.id.clone();
        self.tasks.entry(id).or_insert(task)
    }

    /// Edit mutable fields. Terminal tasks are immutable.
    pub fn update(&mut self, id: &str, patch: TaskPatch, at: DateTime<Utc>) -> Result<(), Rejection> {
        let task = self.task_mut(id)?;
        check(task, TaskAction::Update)?;
        patch.apply(task);
        task.updated_at = at;
        Ok(())
    }

    /// Remove the task entirely.
    pub fn delete(&mut self, id: &str) -> Result<Task, Rejection> {
        let task = self
            .tasks
            .shift_remove(id)
            .ok_or_else(|| Rejection::InvalidReference(id.to_string()))?;
        info!(task_id = %id, "task deleted");
        Ok(task)
    }

    /// Mark work as begun. Returns `true` when the task moved from pending
    /// to in-progress, `false` when it already was in progress.
    pub fn begin_work(&mut self, id: &str, at: DateTime<Utc>) -> Result<bool, Rejection> {
        let task = self.task_mut(id)?;
        match task.status {
            TaskStatus::InProgress => Ok(false),
            TaskStatus::Pending => {
                task.status = TaskStatus::InProgress;
                task.updated_at = at;
                Ok(true)
            }
            from => Err(Rejection::IllegalTransition {
                from,
                action: TaskAction::Start,
            }),
        }
    }

    /// Complete a pending or in-progress task. A second call is rejected,
    /// so a task is only ever counted once.
    pub fn complete(&mut self, id: &str, at: DateTime<Utc>) -> Result<Completion, Rejection> {
        let task = self.task_mut(id)?;
        check(task, TaskAction::Complete)?;
        task.status = TaskStatus::Completed;
        task.completed_at = Some(at);
        task.updated_at = at;
        let met_deadline = task.finished_near_deadline();
        info!(task_id = %id, met_deadline, "task completed");
        Ok(Completion { met_deadline })
    }

    pub fn procrastinate(&mut self, id: &str, at: DateTime<Utc>) -> Result<Procrastination, Rejection> {
        let step = self.procrastination_step;
        let task = self.task_mut(id)?;
        check(task, TaskAction::Procrastinate)?;

        let next = task.procrastination_level as u16 + step as u16;
        task.updated_at = at;
        if next >= MAX_PROCRASTINATION as u16 {
            task.procrastination_level = MAX_PROCRASTINATION;
            task.status = TaskStatus::RunningAway;
            info!(task_id = %id, "task ran away");
            return Ok(Procrastination::RanAway);
        }
        task.procrastination_level = next as u8;
        debug!(task_id = %id, level = next, "task procrastinated");
        Ok(Procrastination::Raised { level: next as u8 })
    }

    /// Credit real seconds of focus to a task. Allowed in any status so a
    /// session that outlives its task's completion is still billed.
    pub fn record_work(&mut self, id: &str, secs: u64, at: DateTime<Utc>) -> Result<(), Rejection> {
        let task = self.task_mut(id)?;
        task.time_spent_secs = task.time_spent_secs.saturating_add(secs);
        task.last_worked_on = Some(at);
        Ok(())
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task, Rejection> {
        self.tasks
            .get_mut(id)
            .ok_or_else(|| Rejection::InvalidReference(id.to_string()))
    }
}

fn check(task: &Task, action: TaskAction) -> Result<(), Rejection> {
    if task.status.allows(action) {
        Ok(())
    } else {
        Err(Rejection::IllegalTransition {
            from: task.status,
            action,
        })
    }
}
