use crate::tracker::Tracker;
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, instrument, warn};

/// Checks the date key on every tick and rolls the tracker over when it
/// changed. Runs until the process exits.
pub fn spawn_rollover_watcher(tracker: Arc<Mutex<Tracker>>, tick: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            check_day(&tracker).await;
        }
    })
}

#[instrument(skip_all)]
async fn check_day(tracker: &Mutex<Tracker>) {
    let mut tracker = tracker.lock().await;
    match tracker.ensure_today().await {
        Ok(true) => debug!(date = %tracker.state().date, "rollover persisted"),
        Ok(false) => {}
        Err(err) => warn!("rollover could not be persisted: {err}"),
    }
}
