use chrono::Utc;
use serde::Serialize;

use super::{print_json, CliResult, Workspace};
use chronodrift_core::{Achievement, ProductivityStats};

#[derive(Serialize)]
struct StatsReport<'a> {
    #[serde(flatten)]
    stats: &'a ProductivityStats,
    /// Streak as of today; zero once a day has been missed.
    effective_streak: u32,
    tasks: usize,
    sessions: usize,
}

#[derive(Serialize)]
struct AchievementReport {
    unlocked: usize,
    total: usize,
    achievements: Vec<Achievement>,
}

pub fn run_stats() -> CliResult {
    let ws = Workspace::open()?;
    let stats = ws.store.stats();
    print_json(&StatsReport {
        stats,
        effective_streak: stats.effective_streak(Utc::now().date_naive()),
        tasks: ws.store.tasks().len(),
        sessions: ws.store.sessions().len(),
    })
}

pub fn run_achievements() -> CliResult {
    let ws = Workspace::open()?;
    let book = ws.store.achievements();
    print_json(&AchievementReport {
        unlocked: book.unlocked_count(),
        total: book.iter().count(),
        achievements: book.to_vec(),
    })
}
