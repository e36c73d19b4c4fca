use serde::{Deserialize, Serialize};

pub const DEFAULT_GOAL: i64 = 1500;
pub const DEFAULT_UNIT: &str = "ml";
pub const MAX_GOAL: i64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeEntry {
    /// Capture time, milliseconds since the Unix epoch.
    pub at: i64,
    pub amount: i64,
}

/// Today's record. Persisted as-is under the state key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyState {
    pub date: String,
    pub goal: i64,
    pub unit: String,
    pub log: Vec<IntakeEntry>,
    pub notify_on: bool,
}

impl DailyState {
    pub fn fresh(date: String) -> Self {
        Self {
            date,
            goal: DEFAULT_GOAL,
            unit: DEFAULT_UNIT.to_string(),
            log: Vec::new(),
            notify_on: false,
        }
    }

    /// The same settings on a new day, with an empty log.
    pub fn rolled_over(&self, date: String) -> Self {
        Self {
            date,
            goal: self.goal,
            unit: self.unit.clone(),
            log: Vec::new(),
            notify_on: self.notify_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub total: i64,
    pub goal: i64,
    pub unit: String,
}

/// How a persisted record was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// Nothing was stored; defaults were used.
    Fresh,
    Restored,
    /// A previous day's state was found; settings carried over, log cleared.
    RolledOver,
    /// The stored value was unreadable or corrupt; defaults were used.
    Recovered,
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub status: LoadStatus,
}

/// A number or the text a user typed for one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawInput {
    /// Integer value the way a lenient `parseInt` reads it: fractions are
    /// truncated and text contributes its leading integer, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(text) => parse_leading_int(text),
        }
    }
}

impl From<i64> for RawInput {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    pub amount: RawInput,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: RawInput,
}

#[derive(Debug, Deserialize)]
pub struct UnitRequest {
    pub unit: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RemindersQuery {
    pub after: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub total: i64,
    /// Height relative to the largest total in the window, in [0, 1].
    pub ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogItem {
    pub at: i64,
    pub amount: i64,
}

/// Everything the page needs to redraw itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub date: String,
    pub goal: i64,
    pub unit: String,
    pub total: i64,
    pub percent: u8,
    pub trend: Vec<TrendPoint>,
    /// Newest first.
    pub log: Vec<LogItem>,
    pub notify_on: bool,
    pub reminder_label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    pub persisted: bool,
    pub dashboard: Dashboard,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
    pub status: LoadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: u64,
    pub at: i64,
    pub title: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_reads_like_parse_int() {
        assert_eq!(parse_leading_int("250"), Some(250));
        assert_eq!(parse_leading_int("  -5"), Some(-5));
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn raw_input_accepts_numbers_and_text() {
        let number: IntakeRequest = serde_json::from_str(r#"{"amount": 300}"#).unwrap();
        assert_eq!(number.amount.as_int(), Some(300));

        let text: IntakeRequest = serde_json::from_str(r#"{"amount": "300ml"}"#).unwrap();
        assert_eq!(text.amount.as_int(), Some(300));

        let float: GoalRequest = serde_json::from_str(r#"{"goal": 1999.9}"#).unwrap();
        assert_eq!(float.goal.as_int(), Some(1999));
    }

    #[test]
    fn daily_state_uses_camel_case_on_disk() {
        let state = DailyState::fresh("2026-03-01".to_string());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["notifyOn"], serde_json::json!(false));
        assert_eq!(json["goal"], serde_json::json!(1500));
        assert_eq!(json["unit"], serde_json::json!("ml"));
    }
}
