pub mod reminder;
pub mod rollover;

pub use reminder::ReminderScheduler;
pub use rollover::spawn_rollover_watcher;
