use crate::history::recent;
use crate::models::{Dashboard, DailyState, HistoryEntry, LogItem, TrendPoint};

pub const TREND_WINDOW: usize = 7;

pub fn total(state: &DailyState) -> i64 {
    state
        .log
        .iter()
        .fold(0i64, |sum, entry| sum.saturating_add(entry.amount))
}

/// Percent of the goal reached, rounded and kept within [0, 100]. A goal
/// of 0 counts as 1.
pub fn progress_percent(state: &DailyState) -> u8 {
    let goal = state.goal.max(1) as f64;
    let percent = (total(state) as f64 / goal * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

pub fn trend_series(history: &[HistoryEntry], window: usize) -> Vec<TrendPoint> {
    let points = recent(history, window);
    let max = points.iter().map(|entry| entry.total).max().unwrap_or(0).max(1) as f64;

    points
        .iter()
        .map(|entry| TrendPoint {
            date: entry.date.clone(),
            total: entry.total,
            ratio: (entry.total as f64 / max).clamp(0.0, 1.0),
        })
        .collect()
}

pub fn reminder_label(notify_on: bool) -> String {
    format!("Reminders: {}", if notify_on { "ON" } else { "OFF" })
}

pub fn build_dashboard(state: &DailyState, history: &[HistoryEntry]) -> Dashboard {
    Dashboard {
        date: state.date.clone(),
        goal: state.goal,
        unit: state.unit.clone(),
        total: total(state),
        percent: progress_percent(state),
        trend: trend_series(history, TREND_WINDOW),
        log: state
            .log
            .iter()
            .rev()
            .map(|entry| LogItem {
                at: entry.at,
                amount: entry.amount,
            })
            .collect(),
        notify_on: state.notify_on,
        reminder_label: reminder_label(state.notify_on),
    }
}
