//! EventStore — the immutable per-session event collection.
//!
//! Loaded once at startup and replaced wholesale on reload, never patched.
//! Each replacement bumps an epoch; an in-flight filter invocation that
//! straddles a reload is no longer applicable and reports itself superseded.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use gigmap_common::{EventRecord, GeoPoint, GigmapError, VenueRecord};

use crate::traits::RecordSource;

// ---------------------------------------------------------------------------
// VenueDirectory
// ---------------------------------------------------------------------------

/// Venue name → coordinates, for event rows that carry no usable
/// coordinates of their own. Lookup is by trimmed, lowercased name.
#[derive(Debug, Default)]
pub struct VenueDirectory {
    by_name: HashMap<String, GeoPoint>,
}

impl VenueDirectory {
    pub fn from_records(records: &[VenueRecord]) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        let mut skipped = 0usize;
        for record in records {
            match record.coords() {
                Some(point) => {
                    by_name.insert(join_key(&record.venue), point);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "venue rows without numeric coordinates ignored");
        }
        Self { by_name }
    }

    /// Coordinates for an event: its own fields if numeric, otherwise the
    /// venue join. `None` excludes the event from the radius stage and the
    /// map surface only.
    pub fn coords_for(&self, event: &EventRecord) -> Option<GeoPoint> {
        event
            .own_coords()
            .or_else(|| self.by_name.get(&join_key(&event.venue)).copied())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn join_key(venue: &str) -> String {
    venue.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// EventStore
// ---------------------------------------------------------------------------

/// One loaded generation of the store. Cheap to clone; filtering works
/// against a snapshot so a concurrent reload never mutates under it.
#[derive(Clone)]
pub struct StoreSnapshot {
    pub epoch: u64,
    pub events: Arc<Vec<EventRecord>>,
    pub venues: Arc<VenueDirectory>,
}

pub struct EventStore {
    inner: RwLock<StoreSnapshot>,
}

impl EventStore {
    /// An empty store at epoch 0. `load` populates it.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreSnapshot {
                epoch: 0,
                events: Arc::new(Vec::new()),
                venues: Arc::new(VenueDirectory::default()),
            }),
        }
    }

    /// Populate (or reload) the collection from the source. The previous
    /// generation is replaced wholesale and the epoch bumped.
    pub async fn load(&self, source: &dyn RecordSource) -> Result<StoreSnapshot, GigmapError> {
        let events = source
            .events()
            .await
            .map_err(|err| GigmapError::Source(err.to_string()))?;
        let venue_rows = source
            .venues()
            .await
            .map_err(|err| GigmapError::Source(err.to_string()))?;
        let venues = VenueDirectory::from_records(&venue_rows);

        let mut guard = self.inner.write().expect("store lock poisoned");
        let snapshot = StoreSnapshot {
            epoch: guard.epoch + 1,
            events: Arc::new(events),
            venues: Arc::new(venues),
        };
        *guard = snapshot.clone();
        info!(
            epoch = snapshot.epoch,
            events = snapshot.events.len(),
            venues = snapshot.venues.len(),
            "event store loaded"
        );
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().expect("store lock poisoned").clone()
    }

    pub fn epoch(&self) -> u64 {
        self.inner.read().expect("store lock poisoned").epoch
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Unit tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedSource {
        events: Vec<EventRecord>,
        venues: Vec<VenueRecord>,
    }

    #[async_trait]
    impl RecordSource for FixedSource {
        async fn events(&self) -> Result<Vec<EventRecord>> {
            Ok(self.events.clone())
        }

        async fn venues(&self) -> Result<Vec<VenueRecord>> {
            Ok(self.venues.clone())
        }
    }

    fn event(title: &str) -> EventRecord {
        EventRecord {
            title: title.into(),
            date: "2024/03/01".into(),
            time: String::new(),
            venue: "The Espy".into(),
            address: String::new(),
            url: String::new(),
            latitude: String::new(),
            longitude: String::new(),
        }
    }

    #[tokio::test]
    async fn load_replaces_wholesale_and_bumps_epoch() {
        let store = EventStore::new();
        assert_eq!(store.epoch(), 0);

        let first = FixedSource {
            events: vec![event("A"), event("B")],
            venues: vec![],
        };
        let snap = store.load(&first).await.unwrap();
        assert_eq!(snap.epoch, 1);
        assert_eq!(snap.events.len(), 2);

        let second = FixedSource {
            events: vec![event("C")],
            venues: vec![],
        };
        let snap = store.load(&second).await.unwrap();
        assert_eq!(snap.epoch, 2);
        assert_eq!(snap.events.len(), 1);
        assert_eq!(snap.events[0].title, "C");
    }

    #[test]
    fn venue_lookup_is_case_insensitive_and_trimmed() {
        let venues = vec![VenueRecord {
            venue: "  The Espy ".into(),
            latitude: "-37.8679".into(),
            longitude: "144.9740".into(),
        }];
        let directory = VenueDirectory::from_records(&venues);

        let coords = directory.coords_for(&event("Gig")).unwrap();
        assert!((coords.lat - -37.8679).abs() < 1e-9);
    }

    #[test]
    fn own_coords_win_over_venue_join() {
        let venues = vec![VenueRecord {
            venue: "The Espy".into(),
            latitude: "-37.8679".into(),
            longitude: "144.9740".into(),
        }];
        let directory = VenueDirectory::from_records(&venues);

        let mut e = event("Gig");
        e.latitude = "-37.0".into();
        e.longitude = "144.0".into();
        assert_eq!(directory.coords_for(&e).unwrap().lat, -37.0);
    }

    #[test]
    fn venue_rows_without_coords_are_skipped() {
        let venues = vec![VenueRecord {
            venue: "The Espy".into(),
            latitude: "unknown".into(),
            longitude: String::new(),
        }];
        let directory = VenueDirectory::from_records(&venues);
        assert!(directory.is_empty());
        assert!(directory.coords_for(&event("Gig")).is_none());
    }
}
