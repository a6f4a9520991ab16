//! Task management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use chronodrift_core::TaskPatch;

use super::{print_json, CliResult, EventLog, Workspace};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Importance from 1 to 5 (default from config)
        #[arg(long, allow_negative_numbers = true)]
        importance: Option<i32>,
        /// Deadline as RFC 3339 (e.g. 2026-05-01T17:00:00Z)
        #[arg(long, value_parser = parse_deadline)]
        deadline: Option<DateTime<Utc>>,
    },
    /// List tasks in creation order
    List {
        /// Filter by status (pending, in-progress, completed, running-away)
        #[arg(long)]
        status: Option<String>,
    },
    /// Get task details
    Show {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
        /// New importance
        #[arg(long, allow_negative_numbers = true)]
        importance: Option<i32>,
        /// New deadline as RFC 3339
        #[arg(long, value_parser = parse_deadline, conflicts_with = "clear_deadline")]
        deadline: Option<DateTime<Utc>>,
        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Mark a task as completed
    Complete {
        /// Task ID
        id: String,
    },
    /// Put a task off; enough of this and it runs away
    Procrastinate {
        /// Task ID
        id: String,
    },
}

fn parse_deadline(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("invalid deadline '{value}': {e}"))
}

pub fn run(action: TaskAction) -> CliResult {
    let mut ws = Workspace::open()?;
    let log = EventLog::attach(&mut ws.store);

    match action {
        TaskAction::Add {
            title,
            description,
            importance,
            deadline,
        } => {
            let importance = importance.unwrap_or_else(|| ws.config.tasks.initial_importance());
            let id = ws.store.add_task(title, description, importance, deadline);
            ws.save()?;
            eprintln!("Task created: {id}");
            print_json(&ws.store.task(&id))?;
        }
        TaskAction::List { status } => {
            let tasks: Vec<_> = ws
                .store
                .tasks()
                .iter()
                .filter(|t| status.as_deref().map_or(true, |s| t.status.to_string() == s))
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Show { id } => {
            let task = ws
                .store
                .task(&id)
                .ok_or_else(|| format!("task not found: {id}"))?;
            print_json(task)?;
        }
        TaskAction::Update {
            id,
            title,
            description,
            clear_description,
            importance,
            deadline,
            clear_deadline,
        } => {
            let patch = TaskPatch {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                importance,
                deadline: if clear_deadline {
                    Some(None)
                } else {
                    deadline.map(Some)
                },
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            ws.store.update_task(&id, patch)?;
            ws.save()?;
            print_json(&ws.store.task(&id))?;
        }
        TaskAction::Delete { id } => {
            let task = ws.store.delete_task(&id)?;
            ws.save()?;
            print_json(&task)?;
        }
        TaskAction::Complete { id } => {
            ws.store.complete_task(&id)?;
            ws.save()?;
            print_json(&log.take())?;
        }
        TaskAction::Procrastinate { id } => {
            ws.store.procrastinate(&id)?;
            ws.save()?;
            print_json(&log.take())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_parses_rfc3339_with_offset() {
        let parsed = parse_deadline("2026-05-01T19:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-05-01T17:00:00+00:00");
        assert!(parse_deadline("tomorrow").is_err());
    }
}
