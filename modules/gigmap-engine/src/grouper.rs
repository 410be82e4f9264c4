//! ResultGrouper — day-grouping of a filtered sequence for the table
//! surface.
//!
//! Grouping is positional: a header row is emitted whenever the day label
//! changes between consecutive records, walking left to right. An input
//! that is not date-sorted can therefore repeat a header for the same day
//! in two non-adjacent runs; a global sort is deliberately not imposed so
//! the store's ordering survives intact.

use gigmap_common::EventRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Day header, e.g. "Friday 01/03".
    Header(String),
    Event(EventRecord),
}

/// Grouped rows, or an explicit empty marker so the boundary renders a
/// no-results message instead of a blank table.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupedRows {
    Empty,
    Rows(Vec<Row>),
}

/// Weekday + day/month label for a record's date. Records whose date fails
/// to parse share an "Unknown date" run so they stay visible in views that
/// are not date-bounded.
pub fn day_label(record: &EventRecord) -> String {
    match record.parsed_date() {
        Some(date) => date.format("%A %d/%m").to_string(),
        None => "Unknown date".to_string(),
    }
}

pub fn group_by_day(records: &[EventRecord]) -> GroupedRows {
    if records.is_empty() {
        return GroupedRows::Empty;
    }

    let mut rows = Vec::with_capacity(records.len() + 4);
    let mut current: Option<String> = None;

    for record in records {
        let label = day_label(record);
        if current.as_deref() != Some(label.as_str()) {
            rows.push(Row::Header(label.clone()));
            current = Some(label);
        }
        rows.push(Row::Event(record.clone()));
    }

    GroupedRows::Rows(rows)
}

// ===========================================================================
// Unit tests
// ===========================================================================
