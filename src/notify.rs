use crate::clock::Clock;
use crate::errors::StorageError;
use crate::models::Reminder;
use crate::tracker::Tracker;
use async_trait::async_trait;
use serde::Serialize;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use tracing::info;

pub const REMINDER_TITLE: &str = "HydroPulse Reminder";
pub const REMINDER_BODY: &str = "Time to sip some water 💧";

const FEED_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    Prompt,
}

/// Whatever can put a notification in front of the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn supported(&self) -> bool;
    fn permission(&self) -> Permission;
    async fn request_permission(&self) -> Permission;
    fn fire(&self, title: &str, body: &str);
}

#[derive(Debug, Default)]
struct Feed {
    next_id: u64,
    items: VecDeque<Reminder>,
}

/// Queues reminders for the page to pick up; the page shows them with the
/// browser's own notification API.
pub struct FeedNotifier {
    clock: Arc<dyn Clock>,
    feed: Mutex<Feed>,
}

impl FeedNotifier {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            feed: Mutex::new(Feed {
                next_id: 1,
                items: VecDeque::new(),
            }),
        }
    }

    /// Reminders with an id greater than `after`, oldest first.
    pub fn since(&self, after: Option<u64>) -> Vec<Reminder> {
        let after = after.unwrap_or(0);
        let feed = self.feed.lock().unwrap_or_else(|err| err.into_inner());
        feed.items
            .iter()
            .filter(|reminder| reminder.id > after)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for FeedNotifier {
    fn supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn fire(&self, title: &str, body: &str) {
        let mut feed = self.feed.lock().unwrap_or_else(|err| err.into_inner());
        let reminder = Reminder {
            id: feed.next_id,
            at: self.clock.now_millis(),
            title: title.to_string(),
            body: body.to_string(),
        };
        feed.next_id += 1;
        info!(id = reminder.id, "reminder fired");
        feed.items.push_back(reminder);
        while feed.items.len() > FEED_CAPACITY {
            feed.items.pop_front();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Unsupported,
    /// Permission was refused; nothing changed.
    Denied,
    Enabled,
    Disabled,
}

/// Flips the reminder setting, asking for permission first when needed.
pub async fn toggle_notify(
    tracker: &mut Tracker,
    notifier: &dyn Notifier,
) -> Result<ToggleOutcome, StorageError> {
    if !notifier.supported() {
        return Ok(ToggleOutcome::Unsupported);
    }

    let enable = if notifier.permission() == Permission::Granted {
        !tracker.state().notify_on
    } else if notifier.request_permission().await == Permission::Granted {
        true
    } else {
        return Ok(ToggleOutcome::Denied);
    };

    tracker.set_notify(enable).await?;
    Ok(if enable {
        ToggleOutcome::Enabled
    } else {
        ToggleOutcome::Disabled
    })
}
