//! Per-day totals ledger, kept sorted by date with one entry per date.

use crate::errors::StorageError;
use crate::models::{HistoryEntry, LoadStatus, Loaded};
use crate::storage::{HISTORY_KEY, KeyValueStore, Record, read_record, write_record};

/// Inserts `entry`, replacing any entry for the same date, and keeps the
/// sequence ascending. With a `limit`, only the newest `limit` entries stay.
pub fn upsert(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry, limit: Option<usize>) {
    entries.retain(|existing| existing.date != entry.date);
    entries.push(entry);
    entries.sort_by(|a, b| a.date.cmp(&b.date));
    if let Some(limit) = limit {
        let excess = entries.len().saturating_sub(limit);
        entries.drain(..excess);
    }
}

/// The last `n` entries of an ascending sequence.
pub fn recent(entries: &[HistoryEntry], n: usize) -> &[HistoryEntry] {
    &entries[entries.len().saturating_sub(n)..]
}

/// Sorts and drops duplicate dates, keeping the last written entry per date.
fn normalize(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut normalized = Vec::with_capacity(entries.len());
    for entry in entries {
        upsert(&mut normalized, entry, None);
    }
    normalized
}

pub async fn load(store: &dyn KeyValueStore) -> Loaded<Vec<HistoryEntry>> {
    match read_record::<Vec<HistoryEntry>>(store, HISTORY_KEY).await {
        Record::Missing => Loaded {
            value: Vec::new(),
            status: LoadStatus::Fresh,
        },
        Record::Found(entries) => Loaded {
            value: normalize(entries),
            status: LoadStatus::Restored,
        },
        Record::Corrupt => Loaded {
            value: Vec::new(),
            status: LoadStatus::Recovered,
        },
    }
}

/// Read-modify-write of the whole ledger. A corrupt ledger is replaced.
pub async fn upsert_today(
    store: &dyn KeyValueStore,
    entry: HistoryEntry,
    limit: Option<usize>,
) -> Result<Vec<HistoryEntry>, StorageError> {
    let mut entries = load(store).await.value;
    upsert(&mut entries, entry, limit);
    write_record(store, HISTORY_KEY, &entries).await?;
    Ok(entries)
}
