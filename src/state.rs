use crate::notify::FeedNotifier;
use crate::tasks::ReminderScheduler;
use crate::tracker::Tracker;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<Tracker>>,
    pub notifier: Arc<FeedNotifier>,
    pub reminders: Arc<Mutex<ReminderScheduler>>,
}

impl AppState {
    pub fn new(tracker: Tracker, notifier: Arc<FeedNotifier>, reminders: ReminderScheduler) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            notifier,
            reminders: Arc::new(Mutex::new(reminders)),
        }
    }
}
