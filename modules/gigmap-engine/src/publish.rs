//! ResultPublisher boundary — projection of a filter result into the two
//! presentation surfaces.
//!
//! Both surfaces are built from the same `FilterResult`, which is what
//! keeps the table and the map synchronized. The engine produces plain
//! data; rendering markup or map primitives is the embedder's job.

use serde::Serialize;

use gigmap_common::EventRecord;

use crate::grouper::{group_by_day, GroupedRows, Row};
use crate::pipeline::FilterResult;
use crate::store::VenueDirectory;

// ---------------------------------------------------------------------------
// Render payloads
// ---------------------------------------------------------------------------

/// One row of the grouped table view. `group_header` is set on the first
/// row of each day run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub group_header: Option<String>,
    pub title: String,
    pub time: String,
    pub venue: String,
    pub address: String,
    pub url: String,
}

/// One point of the map view. Only records with resolvable coordinates
/// (their own or venue-joined) appear here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub title: String,
    pub address: String,
    pub url: String,
}

pub trait ResultPublisher {
    fn publish_table(&self, rows: &[TableRow]);
    fn publish_map(&self, markers: &[MapMarker]);
    /// Zero records matched; render a no-results message.
    fn publish_empty(&self);
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Trailing region suffix stripped for display in the table; the map keeps
/// the full address for popup context.
fn display_address(address: &str, strip_suffix: Option<&str>) -> String {
    let trimmed = address.trim();
    if let Some(suffix) = strip_suffix {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.trim_end().trim_end_matches(',').trim_end().to_string();
        }
    }
    trimmed.to_string()
}

pub fn build_table(grouped: &GroupedRows, strip_suffix: Option<&str>) -> Vec<TableRow> {
    let rows = match grouped {
        GroupedRows::Empty => return Vec::new(),
        GroupedRows::Rows(rows) => rows,
    };

    let mut out = Vec::with_capacity(rows.len());
    let mut pending_header: Option<String> = None;
    for row in rows {
        match row {
            Row::Header(label) => pending_header = Some(label.clone()),
            Row::Event(event) => out.push(TableRow {
                group_header: pending_header.take(),
                title: event.title.clone(),
                time: event.time.clone(),
                venue: event.venue.clone(),
                address: display_address(&event.address, strip_suffix),
                url: event.url.clone(),
            }),
        }
    }
    out
}

pub fn build_markers(records: &[EventRecord], venues: &VenueDirectory) -> Vec<MapMarker> {
    records
        .iter()
        .filter_map(|event| {
            let coords = venues.coords_for(event)?;
            Some(MapMarker {
                lat: coords.lat,
                lon: coords.lon,
                title: event.title.clone(),
                address: event.address.trim().to_string(),
                url: event.url.clone(),
            })
        })
        .collect()
}

/// Hand a completed invocation to the renderers: either the explicit empty
/// signal or both surfaces built from the same record sequence.
pub fn publish_result(
    result: &FilterResult,
    venues: &VenueDirectory,
    strip_suffix: Option<&str>,
    publisher: &dyn ResultPublisher,
) {
    match group_by_day(&result.records) {
        GroupedRows::Empty => publisher.publish_empty(),
        grouped => {
            publisher.publish_table(&build_table(&grouped, strip_suffix));
            publisher.publish_map(&build_markers(&result.records, venues));
        }
    }
}

// ===========================================================================
// Unit tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gigmap_common::VenueRecord;

    fn event(title: &str, date: &str, lat: &str, lon: &str) -> EventRecord {
        EventRecord {
            title: title.into(),
            date: date.into(),
            time: "8pm".into(),
            venue: "Hall".into(),
            address: "1 Main St, Melbourne VIC".into(),
            url: "https://example.com".into(),
            latitude: lat.into(),
            longitude: lon.into(),
        }
    }

    #[test]
    fn table_rows_carry_header_on_first_of_each_run() {
        let records = vec![
            event("Gig", "2024/03/01", "", ""),
            event("Encore", "2024/03/01", "", ""),
            event("Fair", "2024/03/02", "", ""),
        ];
        let rows = build_table(&group_by_day(&records), None);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].group_header.as_deref(), Some("Friday 01/03"));
        assert_eq!(rows[1].group_header, None);
        assert_eq!(rows[2].group_header.as_deref(), Some("Saturday 02/03"));
    }

    #[test]
    fn display_address_strips_configured_suffix() {
        let records = vec![event("Gig", "2024/03/01", "", "")];
        let rows = build_table(&group_by_day(&records), Some(", Melbourne VIC"));
        assert_eq!(rows[0].address, "1 Main St");
    }

    #[test]
    fn markers_skip_records_without_coordinates() {
        let records = vec![
            event("Gig", "2024/03/01", "-37.81", "144.96"),
            event("Expo", "2024/03/02", "", ""),
        ];
        let markers = build_markers(&records, &VenueDirectory::default());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].title, "Gig");
    }

    #[test]
    fn markers_use_venue_join_when_record_lacks_coords() {
        let venues = VenueDirectory::from_records(&[VenueRecord {
            venue: "Hall".into(),
            latitude: "-37.5".into(),
            longitude: "144.5".into(),
        }]);
        let records = vec![event("Expo", "2024/03/02", "", "")];
        let markers = build_markers(&records, &venues);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].lat, -37.5);
    }

    #[test]
    fn markers_keep_full_address() {
        let records = vec![event("Gig", "2024/03/01", "-37.81", "144.96")];
        let markers = build_markers(&records, &VenueDirectory::default());
        assert_eq!(markers[0].address, "1 Main St, Melbourne VIC");
    }
}
