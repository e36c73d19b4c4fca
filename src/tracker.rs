//! Today's intake record and the rules that keep it and the history ledger
//! in step.
//!
//! Mutators never render. Every mutator changes the in-memory state first,
//! then persists it together with today's history entry; an `Err` only means
//! the change did not reach storage. Callers rebuild the dashboard after each
//! call.

use crate::clock::Clock;
use crate::errors::StorageError;
use crate::history;
use crate::models::{
    DEFAULT_GOAL, DEFAULT_UNIT, DailyState, Dashboard, HistoryEntry, IntakeEntry, LoadStatus,
    Loaded, MAX_GOAL, RawInput,
};
use crate::progress::{self, TREND_WINDOW};
use crate::storage::{KeyValueStore, Record, STATE_KEY, read_record, write_record};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Stored state as found on disk; every field may be missing or mistyped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    date: Option<Value>,
    goal: Option<Value>,
    unit: Option<Value>,
    log: Option<Value>,
    notify_on: Option<Value>,
}

impl StoredState {
    fn date(&self) -> Option<&str> {
        self.date.as_ref().and_then(Value::as_str)
    }

    fn goal(&self) -> i64 {
        match self.goal.as_ref().and_then(number_value) {
            Some(goal) => goal.clamp(0, MAX_GOAL),
            None => DEFAULT_GOAL,
        }
    }

    /// Same day: any stored string is kept verbatim. New day: an empty label
    /// falls back to the default.
    fn unit(&self, same_day: bool) -> String {
        match &self.unit {
            Some(Value::String(unit)) if same_day || !unit.is_empty() => unit.clone(),
            _ => DEFAULT_UNIT.to_string(),
        }
    }

    fn notify_on(&self) -> bool {
        matches!(self.notify_on, Some(Value::Bool(true)))
    }

    /// `None` when a log is present but not a valid entry list.
    fn log(self) -> Option<Vec<IntakeEntry>> {
        match self.log {
            None | Some(Value::Null) => Some(Vec::new()),
            Some(log) => serde_json::from_value(log).ok(),
        }
    }
}

fn number_value(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
}

fn resolve_stored(record: Record<StoredState>, today: String) -> Loaded<DailyState> {
    match record {
        Record::Missing => Loaded {
            value: DailyState::fresh(today),
            status: LoadStatus::Fresh,
        },
        Record::Corrupt => Loaded {
            value: DailyState::fresh(today),
            status: LoadStatus::Recovered,
        },
        Record::Found(stored) => {
            let same_day = stored.date() == Some(today.as_str());
            let goal = stored.goal();
            let unit = stored.unit(same_day);
            let notify_on = stored.notify_on();

            let (log, status) = if !same_day {
                (Vec::new(), LoadStatus::RolledOver)
            } else {
                match stored.log() {
                    Some(log) => (log, LoadStatus::Restored),
                    None => (Vec::new(), LoadStatus::Recovered),
                }
            };

            Loaded {
                value: DailyState {
                    date: today,
                    goal,
                    unit,
                    log,
                    notify_on,
                },
                status,
            }
        }
    }
}

/// Parses a goal the way the goal field does: leading integer, 0 when
/// unparseable, clamped to [0, MAX_GOAL].
pub fn clamp_goal(raw: &RawInput) -> i64 {
    raw.as_int().unwrap_or(0).clamp(0, MAX_GOAL)
}

pub struct Tracker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    history_limit: Option<usize>,
    state: DailyState,
}

impl Tracker {
    /// Reads the stored state, applying the rollover rule. Never fails:
    /// unreadable data yields defaults with `LoadStatus::Recovered`, keeping
    /// whatever settings could still be read.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        history_limit: Option<usize>,
    ) -> Loaded<Self> {
        let record = read_record::<StoredState>(store.as_ref(), STATE_KEY).await;
        let loaded = resolve_stored(record, clock.today_key());

        match loaded.status {
            LoadStatus::RolledOver => info!(date = %loaded.value.date, "rolled over to a new day"),
            LoadStatus::Recovered => warn!("stored state was unreadable, falling back to defaults"),
            _ => {}
        }

        Loaded {
            value: Self {
                store,
                clock,
                history_limit,
                state: loaded.value,
            },
            status: loaded.status,
        }
    }

    pub fn state(&self) -> &DailyState {
        &self.state
    }

    /// Applies the rollover in memory if the date key changed. Returns
    /// whether it did.
    pub fn sync_day(&mut self) -> bool {
        let today = self.clock.today_key();
        if self.state.date == today {
            return false;
        }
        info!(from = %self.state.date, to = %today, "day changed, clearing intake log");
        self.state = self.state.rolled_over(today);
        true
    }

    /// `sync_day`, persisting when the day changed.
    pub async fn ensure_today(&mut self) -> Result<bool, StorageError> {
        if !self.sync_day() {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    pub async fn add(&mut self, amount: i64) -> Result<(), StorageError> {
        if amount == 0 {
            return Ok(());
        }
        self.sync_day();
        self.state.log.push(IntakeEntry {
            at: self.clock.now_millis(),
            amount,
        });
        self.persist().await
    }

    pub async fn undo(&mut self) -> Result<(), StorageError> {
        self.sync_day();
        self.state.log.pop();
        self.persist().await
    }

    pub async fn reset_today(&mut self) -> Result<(), StorageError> {
        self.sync_day();
        self.state.log.clear();
        self.persist().await
    }

    pub async fn set_goal(&mut self, raw: impl Into<RawInput>) -> Result<(), StorageError> {
        self.sync_day();
        self.state.goal = clamp_goal(&raw.into());
        self.persist().await
    }

    pub async fn set_unit(&mut self, label: impl Into<String>) -> Result<(), StorageError> {
        self.sync_day();
        self.state.unit = label.into();
        self.persist().await
    }

    pub async fn set_notify(&mut self, on: bool) -> Result<(), StorageError> {
        self.sync_day();
        self.state.notify_on = on;
        self.persist().await
    }

    pub fn total(&self) -> i64 {
        progress::total(&self.state)
    }

    pub fn progress_percent(&self) -> u8 {
        progress::progress_percent(&self.state)
    }

    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            date: self.state.date.clone(),
            total: self.total(),
            goal: self.state.goal,
            unit: self.state.unit.clone(),
        }
    }

    pub async fn history(&self) -> Loaded<Vec<HistoryEntry>> {
        history::load(self.store.as_ref()).await
    }

    /// The newest `n` history entries, ascending by date.
    pub async fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        history::recent(&self.history().await.value, n).to_vec()
    }

    pub async fn dashboard(&self) -> Dashboard {
        let history = self.recent(TREND_WINDOW).await;
        progress::build_dashboard(&self.state, &history)
    }

    async fn persist(&self) -> Result<(), StorageError> {
        write_record(self.store.as_ref(), STATE_KEY, &self.state).await?;
        history::upsert_today(self.store.as_ref(), self.history_entry(), self.history_limit).await?;
        Ok(())
    }
}
