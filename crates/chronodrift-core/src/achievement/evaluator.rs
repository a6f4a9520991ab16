//! Achievement rule evaluation.
//!
//! Rules are pure predicates over an [`AggregateView`]. The evaluator keeps
//! no state of its own; one-shot semantics come from the book it is paired
//! with.

use super::{AchievementBook, AchievementId};
use crate::session::FocusSession;
use crate::stats::ProductivityStats;
use crate::task::{TaskLifecycleAutomaton, TaskStatus};

pub const FIVE_TASKS_THRESHOLD: u64 = 5;
pub const TIME_BENDER_MIN_DISTORTION: f64 = 75.0;
pub const TIME_BENDER_MIN_SECS: u64 = 4 * 60 * 60;
pub const DEADLINE_WARRIOR_THRESHOLD: u64 = 3;

/// Read-only view of everything the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct AggregateView<'a> {
    pub tasks: &'a TaskLifecycleAutomaton,
    pub sessions: &'a [FocusSession],
    pub stats: &'a ProductivityStats,
}

impl AggregateView<'_> {
    fn completed_near_deadline(&self) -> u64 {
        let live = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed && t.finished_near_deadline())
            .count() as u64;
        // Deleted tasks only survive in the counter.
        live.max(self.stats.deadline_finishes)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AchievementEvaluator;

impl AchievementEvaluator {
    pub fn is_met(id: AchievementId, view: &AggregateView<'_>) -> bool {
        match id {
            AchievementId::FirstTask => view.stats.total_tasks_created >= 1 || !view.tasks.is_empty(),
            AchievementId::FiveTasksCompleted => {
                view.stats.total_tasks_completed >= FIVE_TASKS_THRESHOLD
            }
            AchievementId::ProcrastinationMaster => {
                view.stats.total_tasks_fled >= 1
                    || view.tasks.count_by_status(TaskStatus::RunningAway) > 0
            }
            AchievementId::TimeBender => view.sessions.iter().any(|s| {
                s.is_closed()
                    && s.distortion_level > TIME_BENDER_MIN_DISTORTION
                    && s.duration_secs > TIME_BENDER_MIN_SECS
            }),
            AchievementId::DeadlineWarrior => {
                view.completed_near_deadline() >= DEADLINE_WARRIOR_THRESHOLD
            }
        }
    }

    /// Every rule whose predicate currently holds.
    pub fn evaluate(view: &AggregateView<'_>) -> Vec<AchievementId> {
        AchievementId::ALL
            .into_iter()
            .filter(|id| Self::is_met(*id, view))
            .collect()
    }

    /// Rules that hold but are not unlocked in `book` yet.
    pub fn pending_unlocks(view: &AggregateView<'_>, book: &AchievementBook) -> Vec<AchievementId> {
        Self::evaluate(view)
            .into_iter()
            .filter(|id| !book.is_unlocked(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn closed_session(distortion: f64, secs: u64) -> FocusSession {
        let start = Utc::now();
        FocusSession {
            id: "s".into(),
            task_id: "t".into(),
            start_time: start,
            end_time: Some(start + Duration::seconds(secs as i64)),
            duration_secs: secs,
            distortion_level: distortion,
        }
    }

    #[test]
    fn empty_state_meets_nothing() {
        let tasks = TaskLifecycleAutomaton::default();
        let stats = ProductivityStats::default();
        let view = AggregateView {
            tasks: &tasks,
            sessions: &[],
            stats: &stats,
        };
        assert!(AchievementEvaluator::evaluate(&view).is_empty());
    }

    #[test]
    fn counters_drive_simple_rules() {
        let tasks = TaskLifecycleAutomaton::default();
        let stats = ProductivityStats {
            total_tasks_created: 7,
            total_tasks_completed: 5,
            total_tasks_fled: 1,
            ..Default::default()
        };
        let view = AggregateView {
            tasks: &tasks,
            sessions: &[],
            stats: &stats,
        };
        assert_eq!(
            AchievementEvaluator::evaluate(&view),
            vec![
                AchievementId::FirstTask,
                AchievementId::FiveTasksCompleted,
                AchievementId::ProcrastinationMaster,
            ]
        );
    }

    #[test]
    fn time_bender_needs_both_thresholds_strictly() {
        let tasks = TaskLifecycleAutomaton::default();
        let stats = ProductivityStats::default();
        let check = |sessions: &[FocusSession]| {
            AchievementEvaluator::is_met(
                AchievementId::TimeBender,
                &AggregateView {
                    tasks: &tasks,
                    sessions,
                    stats: &stats,
                },
            )
        };
        assert!(!check(&[closed_session(75.0, 20_000)]));
        assert!(!check(&[closed_session(90.0, 14_400)]));
        assert!(check(&[closed_session(75.5, 14_401)]));
    }

    #[test]
    fn deadline_warrior_counts_completed_tasks() {
        let mut tasks = TaskLifecycleAutomaton::default();
        let now = Utc::now();
        for i in 0..3 {
            let id = tasks
                .add(format!("t{i}"), None, 3, Some(now + Duration::seconds(60)), now)
                .id
                .clone();
            tasks.complete(&id, now).unwrap();
        }
        let stats = ProductivityStats::default();
        let view = AggregateView {
            tasks: &tasks,
            sessions: &[],
            stats: &stats,
        };
        assert!(AchievementEvaluator::is_met(AchievementId::DeadlineWarrior, &view));
    }

    #[test]
    fn pending_unlocks_skips_unlocked() {
        let mut tasks = TaskLifecycleAutomaton::default();
        tasks.add("t", None, 3, None, Utc::now());
        let stats = ProductivityStats::default();
        let view = AggregateView {
            tasks: &tasks,
            sessions: &[],
            stats: &stats,
        };
        let mut book = AchievementBook::default();
        assert_eq!(
            AchievementEvaluator::pending_unlocks(&view, &book),
            vec![AchievementId::FirstTask]
        );
        book.unlock(AchievementId::FirstTask, Utc::now());
        assert!(AchievementEvaluator::pending_unlocks(&view, &book).is_empty());
    }
}
