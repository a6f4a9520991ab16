//! One-shot achievements.
//!
//! The catalogue is closed: every rule is an [`AchievementId`] variant and
//! the [`AchievementBook`] always holds exactly one entry per variant.

mod evaluator;

pub use evaluator::{AchievementEvaluator, AggregateView};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementId {
    FirstTask,
    FiveTasksCompleted,
    ProcrastinationMaster,
    TimeBender,
    DeadlineWarrior,
}

impl AchievementId {
    pub const ALL: [AchievementId; 5] = [
        AchievementId::FirstTask,
        AchievementId::FiveTasksCompleted,
        AchievementId::ProcrastinationMaster,
        AchievementId::TimeBender,
        AchievementId::DeadlineWarrior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstTask => "first-task",
            AchievementId::FiveTasksCompleted => "five-tasks-completed",
            AchievementId::ProcrastinationMaster => "procrastination-master",
            AchievementId::TimeBender => "time-bender",
            AchievementId::DeadlineWarrior => "deadline-warrior",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AchievementId::FirstTask => "First Step",
            AchievementId::FiveTasksCompleted => "Getting Things Done",
            AchievementId::ProcrastinationMaster => "Procrastination Master",
            AchievementId::TimeBender => "Time Bender",
            AchievementId::DeadlineWarrior => "Deadline Warrior",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::FirstTask => "Create your first task",
            AchievementId::FiveTasksCompleted => "Complete five tasks",
            AchievementId::ProcrastinationMaster => "Procrastinate until a task runs away",
            AchievementId::TimeBender => {
                "Finish a focus session of more than four hours above 75% distortion"
            }
            AchievementId::DeadlineWarrior => {
                "Complete three tasks within ten minutes of their deadline"
            }
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub is_unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn locked(id: AchievementId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            description: id.description().to_string(),
            is_unlocked: false,
            unlocked_at: None,
        }
    }
}

/// Unlock state for the whole catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementBook {
    entries: Vec<Achievement>,
}

impl Default for AchievementBook {
    fn default() -> Self {
        Self {
            entries: AchievementId::ALL.iter().copied().map(Achievement::locked).collect(),
        }
    }
}

impl AchievementBook {
    /// Rebuild from saved entries. A duplicated rule keeps its first unlock;
    /// rules missing from the save start out locked.
    pub fn from_saved(saved: impl IntoIterator<Item = Achievement>) -> Self {
        let mut book = Self::default();
        for entry in saved {
            if let Some(slot) = book.entries.iter_mut().find(|e| e.id == entry.id) {
                if entry.is_unlocked && !slot.is_unlocked {
                    slot.is_unlocked = true;
                    slot.unlocked_at = entry.unlocked_at;
                }
            }
        }
        book
    }

    pub fn get(&self, id: AchievementId) -> Option<&Achievement> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.get(id).is_some_and(|e| e.is_unlocked)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.entries.iter()
    }

    pub fn unlocked_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_unlocked).count()
    }

    /// Unlock a rule. Already unlocked rules are left untouched, including
    /// their `unlocked_at`.
    pub fn unlock(&mut self, id: AchievementId, at: DateTime<Utc>) -> Option<Event> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        if entry.is_unlocked {
            return None;
        }
        entry.is_unlocked = true;
        entry.unlocked_at = Some(at);
        info!(achievement = %id, "achievement unlocked");
        Some(Event::AchievementUnlocked { id, at })
    }

    pub fn to_vec(&self) -> Vec<Achievement> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn book_covers_catalogue() {
        let book = AchievementBook::default();
        assert_eq!(book.iter().count(), AchievementId::ALL.len());
        assert_eq!(book.unlocked_count(), 0);
    }

    #[test]
    fn unlock_is_idempotent() {
        let mut book = AchievementBook::default();
        let first = Utc::now();
        assert!(book.unlock(AchievementId::TimeBender, first).is_some());
        assert!(book
            .unlock(AchievementId::TimeBender, first + Duration::hours(1))
            .is_none());

        let entry = book.get(AchievementId::TimeBender).unwrap();
        assert!(entry.is_unlocked);
        assert_eq!(entry.unlocked_at, Some(first));
    }

    #[test]
    fn from_saved_fills_missing_rules() {
        let now = Utc::now();
        let mut saved = Achievement::locked(AchievementId::FirstTask);
        saved.is_unlocked = true;
        saved.unlocked_at = Some(now);

        let book = AchievementBook::from_saved(vec![saved]);
        assert!(book.is_unlocked(AchievementId::FirstTask));
        assert_eq!(book.get(AchievementId::FirstTask).unwrap().unlocked_at, Some(now));
        assert!(!book.is_unlocked(AchievementId::DeadlineWarrior));
        assert_eq!(book.iter().count(), 5);
    }

    #[test]
    fn ids_serialize_as_rule_names() {
        for id in AchievementId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }
}
