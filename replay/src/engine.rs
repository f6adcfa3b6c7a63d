use std::ops::Range;

use ctl::{BlockStore, ChangeLog};
use log::{debug, info};
use serde_json::Value;

use crate::entry::ReplayEntry;
use crate::error::{DiagnosticError, ReplayError};

/// A log entry that was applied during replay.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedChange {
    pub index: usize,
    pub block_name: String,
    pub timestamp: Option<String>,
}

/// Result of replaying onto a copy of a target store.
#[derive(Debug, Clone)]
pub struct Replayed {
    pub store: BlockStore,
    pub applied: Vec<AppliedChange>,
}

/// Replay a serialized change log onto a copy of `target`.
///
/// `source` is the JSON text of the log and `source_id` its id in the
/// caller's file database, used for error spans. `target` is never modified.
pub fn replay(target: &BlockStore, source: &str, source_id: usize) -> Result<Replayed, DiagnosticError> {
    let mut store = target.copy();
    let applied = replay_into(&mut store, source, source_id)?;
    info!("all {} change(s) replayed successfully", applied.len());
    Ok(Replayed { store, applied })
}

/// Replay a serialized change log directly onto `store`.
///
/// Entries are applied in log order. On failure the entries before the
/// failing one stay applied.
pub fn replay_into(
    store: &mut BlockStore,
    source: &str,
    source_id: usize,
) -> Result<Vec<AppliedChange>, DiagnosticError> {
    let records = read_records(source, source_id)?;
    debug!("replaying {} change log entries", records.len());

    let mut applied = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let change = ReplayEntry::from_value(record)
            .and_then(|entry| apply_entry(store, index, entry))
            .map_err(|error| DiagnosticError::at_entry(error, index, source_id))?;
        applied.push(change);
    }
    Ok(applied)
}

/// Replay an in-memory change log onto a copy of `target`.
pub fn replay_log(target: &BlockStore, log: &ChangeLog) -> Result<Replayed, DiagnosticError> {
    let mut store = target.copy();
    let mut applied = Vec::with_capacity(log.len());
    for (index, entry) in log.iter().enumerate() {
        let change = apply_entry(&mut store, index, ReplayEntry::from(entry))
            .map_err(|error| DiagnosticError::at_entry(error, index, 0))?;
        applied.push(change);
    }
    info!("all {} change(s) replayed successfully", applied.len());
    Ok(Replayed { store, applied })
}

fn apply_entry(
    store: &mut BlockStore,
    index: usize,
    entry: ReplayEntry,
) -> Result<AppliedChange, ReplayError> {
    store.update_block(&entry.block_name, entry.updated_content)?;
    info!(
        "block '{}' updated at {}",
        entry.block_name,
        entry.timestamp.as_deref().unwrap_or("unknown time")
    );
    Ok(AppliedChange {
        index,
        block_name: entry.block_name,
        timestamp: entry.timestamp,
    })
}

fn read_records(source: &str, source_id: usize) -> Result<Vec<Value>, DiagnosticError> {
    let value: Value = serde_json::from_str(source).map_err(|e| {
        DiagnosticError::at_span(
            ReplayError::MalformedChangeLog(e.to_string()),
            error_span(source, e.line(), e.column()),
            source_id,
        )
    })?;

    match value {
        Value::Array(records) => Ok(records),
        _ => Err(DiagnosticError::at_span(
            ReplayError::MalformedChangeLog("expected a list of entries".to_string()),
            0..source.len(),
            source_id,
        )),
    }
}

/// Byte span of a one-based line/column position reported by serde_json.
fn error_span(source: &str, line: usize, column: usize) -> Range<usize> {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let start = (line_start + column.saturating_sub(1)).min(source.len());
    let end = source
        .get(start..)
        .and_then(|rest| rest.chars().next())
        .map_or(start, |c| start + c.len_utf8());
    start..end
}
