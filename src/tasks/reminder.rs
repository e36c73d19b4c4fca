use crate::notify::{Notifier, Permission, REMINDER_BODY, REMINDER_TITLE};
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info};

/// Owns the single periodic reminder task.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>, interval: Duration) -> Self {
        Self {
            notifier,
            interval,
            handle: None,
        }
    }

    /// Drops any running timer, then starts a fresh one if reminders are
    /// enabled and allowed.
    pub fn apply(&mut self, enabled: bool) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("reminder timer cleared");
        }

        let allowed =
            self.notifier.supported() && self.notifier.permission() == Permission::Granted;
        if !enabled || !allowed {
            return;
        }

        let notifier = self.notifier.clone();
        let interval = self.interval;
        info!(every_secs = interval.as_secs(), "reminder timer started");
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                notifier.fire(REMINDER_TITLE, REMINDER_BODY);
            }
        }));
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
