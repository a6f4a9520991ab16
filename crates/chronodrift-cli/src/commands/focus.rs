//! Foreground focus countdown.
//!
//! Opens a focus session, runs the countdown on a ticker until it completes
//! or Ctrl-C arrives, then closes the session and saves the tracker. Events
//! are printed as JSON lines while the countdown runs.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use chronodrift_core::{ClockState, FocusSession, SharedStore, Ticker};
use serde::Serialize;
use tokio::sync::Mutex;

use super::{print_json, CliResult, Workspace};

/// Printed once the countdown stops.
#[derive(Serialize)]
struct FocusReport<'a> {
    session: Option<&'a FocusSession>,
    clock_state: ClockState,
    /// Share of the countdown drained, 0.0 to 1.0.
    progress: f64,
    remaining_ms: u64,
}

#[derive(Args)]
pub struct FocusArgs {
    /// Task ID
    pub task_id: String,
    /// Countdown length in minutes (default from config)
    #[arg(long)]
    pub minutes: Option<f64>,
    /// Distortion level to switch to, 0-100
    #[arg(long, allow_negative_numbers = true)]
    pub distortion: Option<f64>,
    /// Seconds of real time before distortion kicks in
    #[arg(long, default_value_t = 0, requires = "distortion")]
    pub distort_after: u64,
}

pub fn run(args: FocusArgs) -> CliResult {
    let ws = Workspace::open()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(focus(ws, args))
}

async fn focus(ws: Workspace, args: FocusArgs) -> CliResult {
    let Workspace {
        db,
        config,
        mut store,
    } = ws;

    let duration = match args.minutes {
        Some(minutes) => Duration::try_from_secs_f64(minutes * 60.0)
            .map_err(|e| format!("invalid --minutes '{minutes}': {e}"))?,
        None => store.default_duration(),
    };

    store.subscribe(|event| {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
    });
    store.start_focus_session(&args.task_id)?;
    store.start_timer(duration);

    let store: SharedStore = Arc::new(Mutex::new(store));
    let mut ticker = Ticker::spawn(store.clone(), config.timer.tick_interval());

    if let Some(level) = args.distortion {
        let store = store.clone();
        let delay = Duration::from_secs(args.distort_after);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut guard = store.lock().await;
            if guard.clock().state().is_ticking() {
                guard.set_distortion_level(level);
                guard.enter_distortion();
            }
        });
    }

    let interrupted = tokio::select! {
        _ = ticker.wait() => false,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            true
        }
    };
    if interrupted {
        ticker.cancel();
        tracing::info!("focus interrupted");
    }

    let mut guard = store.lock().await;
    if guard.active_session().is_some() {
        guard.end_focus_session()?;
    }
    db.save_snapshot(&guard.snapshot())?;
    print_json(&FocusReport {
        session: guard.sessions().last(),
        clock_state: guard.clock().state(),
        progress: guard.clock().progress(),
        remaining_ms: guard.clock().remaining_ms(),
    })?;
    Ok(())
}
