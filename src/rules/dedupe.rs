use itertools::Itertools;

use crate::loader::{Column, Table};

/// Rows of `segment_rows` whose key is shared with at least one other row.
///
/// Groups by the key vector (aligned with `segment_rows`), keeps every member
/// of each group with more than one member — not just the extras — in segment
/// order, and projects to {Address, report column}. Empty keys group together
/// like any other value: two rows with blank keys are duplicates of each
/// other.
pub fn find_duplicates(
    table: &Table,
    segment_rows: &[usize],
    keys: &[String],
    address: Column,
    report: Column,
) -> Vec<Vec<String>> {
    debug_assert_eq!(segment_rows.len(), keys.len());
    let occurrences = keys.iter().map(String::as_str).counts();

    segment_rows
        .iter()
        .zip(keys)
        .filter(|(_, key)| occurrences[key.as_str()] > 1)
        .map(|(&row, _)| {
            vec![
                table.value(row, address).to_string(),
                table.value(row, report).to_string(),
            ]
        })
        .collect()
}
