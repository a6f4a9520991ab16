//! Cancellable tick source.
//!
//! Drives [`TrackerStore::tick`] from a `tokio` interval, measuring real
//! elapsed time with the monotonic `tokio::time::Instant` between ticks. The
//! loop stops by itself once the clock is `Completed` or `Idle`, and
//! [`Ticker::cancel`] stops it immediately: the token is checked again after
//! the store lock is taken, so a tick that was already waiting for the lock
//! does not apply.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::engine::ClockState;
use crate::store::TrackerStore;

/// Store handle shared between the host and the ticker.
pub type SharedStore = Arc<Mutex<TrackerStore>>;

pub struct Ticker {
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the tick loop on the current tokio runtime.
    pub fn spawn(store: SharedStore, period: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(store, period, cancel_token.clone()));
        Self {
            cancel_token,
            handle: Some(handle),
        }
    }

    /// Stop ticking. No tick mutates the store after this returns.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the loop to exit, either through cancellation or because the
    /// clock stopped.
    pub async fn wait(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            if let Err(err) = handle.await {
                warn!(error = %err, "tick loop ended abnormally");
            }
            self.handle = None;
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn tick_loop(store: SharedStore, period: Duration, cancel_token: CancellationToken) {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = interval.tick() => {}
        }

        let mut guard = store.lock().await;
        if cancel_token.is_cancelled() {
            break;
        }

        let now = Instant::now();
        let dt = now.saturating_duration_since(last);
        last = now;
        guard.tick(dt);

        if matches!(guard.clock().state(), ClockState::Completed | ClockState::Idle) {
            break;
        }
    }

    debug!("ticker stopped");
}
