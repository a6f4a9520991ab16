//! Aggregate productivity counters and day streaks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a closed session moved the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Another session on an already counted day.
    Unchanged,
    /// Activity on the day after the last active day.
    Extended,
    /// First activity ever, or activity after a gap.
    Restarted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductivityStats {
    /// Incremented once per task, on its first completion.
    pub total_tasks_completed: u64,
    /// Sum of closed session durations in real seconds.
    pub total_time_spent_secs: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_day: Option<NaiveDate>,
    /// Tasks ever created, including deleted ones.
    #[serde(default)]
    pub total_tasks_created: u64,
    /// Tasks that ever ran away, including deleted ones.
    #[serde(default)]
    pub total_tasks_fled: u64,
    /// Completions that landed in the window right before a deadline.
    #[serde(default)]
    pub deadline_finishes: u64,
}

impl ProductivityStats {
    /// Count a day with at least one closed focus session.
    pub fn record_activity(&mut self, day: NaiveDate) -> StreakChange {
        let change = match self.last_active_day {
            Some(last) if day <= last => StreakChange::Unchanged,
            Some(last) if last.succ_opt() == Some(day) => StreakChange::Extended,
            _ => StreakChange::Restarted,
        };

        match change {
            StreakChange::Unchanged => {
                self.current_streak = self.current_streak.max(1);
            }
            StreakChange::Extended => {
                self.current_streak += 1;
                self.last_active_day = Some(day);
            }
            StreakChange::Restarted => {
                self.current_streak = 1;
                self.last_active_day = Some(day);
            }
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        change
    }

    /// Streak as it stands on `today`: a streak whose last day is older
    /// than yesterday has lapsed and reads as 0.
    pub fn effective_streak(&self, today: NaiveDate) -> u32 {
        match self.last_active_day {
            Some(last) if last == today || last.succ_opt() == Some(today) => self.current_streak,
            _ => 0,
        }
    }
}
