use chrono::{Days, Local, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of "today" and "now" for everything that partitions data by day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    fn today_key(&self) -> String {
        date_key(self.today())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    inner: Mutex<(NaiveDate, i64)>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            inner: Mutex::new((date, midnight_millis(date))),
        }
    }

    pub fn set_date(&self, date: NaiveDate) {
        let mut inner = self.inner.lock().unwrap_or_else(|err| err.into_inner());
        *inner = (date, midnight_millis(date));
    }

    pub fn advance_days(&self, days: u64) {
        let next = self.today() + Days::new(days);
        self.set_date(next);
    }

    pub fn advance_millis(&self, millis: i64) {
        let mut inner = self.inner.lock().unwrap_or_else(|err| err.into_inner());
        inner.1 += millis;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.inner.lock().unwrap_or_else(|err| err.into_inner()).0
    }

    fn now_millis(&self) -> i64 {
        self.inner.lock().unwrap_or_else(|err| err.into_inner()).1
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}
