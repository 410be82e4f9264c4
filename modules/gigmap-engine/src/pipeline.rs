//! FilterPipeline — conjunctive composition of the active filter stages
//! over one store snapshot.
//!
//! The stages are commutative; they run date → text → radius in a single
//! pass only because the radius stage needs an awaited geocode resolution
//! first. The resolved center is reused for the whole invocation, never
//! re-resolved per record.
//!
//! Latest-invocation-wins: each `run` takes a monotonic ticket at entry.
//! After the geocode await, a newer ticket or a reloaded store means this
//! invocation's result must not be rendered, and `Superseded` is returned
//! instead. That staleness check is the only cancellation primitive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use geocode_client::{GeocodeClient, GeocodeError};
use gigmap_common::{haversine_km, Config, EventRecord, GeoPoint};

use crate::criteria::{self, FilterCriteria, FilterIssue};
use crate::store::{EventStore, StoreSnapshot};
use crate::traits::Geocoder;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Counters for one invocation, split by the stage that dropped the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub input: usize,
    pub matched: usize,
    pub dropped_by_date: usize,
    pub dropped_by_text: usize,
    pub dropped_by_radius: usize,
}

/// The outcome every completed invocation hands to the boundary. Always
/// present, possibly with zero records; the issues are what the UI shows
/// for stages that could not run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    /// Surviving records, in the store's original relative order.
    pub records: Vec<EventRecord>,
    pub issues: Vec<FilterIssue>,
    /// Center actually applied by the radius stage, for the map surface.
    pub center: Option<GeoPoint>,
    pub radius_km: Option<f64>,
    pub stats: FilterStats,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Completed(FilterResult),
    /// A newer invocation started (or the store reloaded) while this one
    /// was waiting on the geocoder. The caller must discard it.
    Superseded,
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Post-hoc summary of a completed invocation, for side-channel consumers
/// (analytics, debug overlays). Decoupled from filter logic.
#[derive(Debug, Clone)]
pub struct FilterSummary {
    pub criteria: FilterCriteria,
    pub stats: FilterStats,
    pub issue_count: usize,
    pub epoch: u64,
}

pub trait FilterObserver: Send + Sync {
    fn on_result(&self, summary: &FilterSummary);
}

/// Observer that logs each completed invocation via `tracing`.
pub struct TracingObserver;

impl FilterObserver for TracingObserver {
    fn on_result(&self, summary: &FilterSummary) {
        info!(
            input = summary.stats.input,
            matched = summary.stats.matched,
            issues = summary.issue_count,
            epoch = summary.epoch,
            "filter invocation completed"
        );
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct FilterPipeline {
    store: Arc<EventStore>,
    geocoder: Arc<dyn Geocoder>,
    observer: Option<Arc<dyn FilterObserver>>,
    ticket: AtomicU64,
}

impl FilterPipeline {
    pub fn new(store: Arc<EventStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            store,
            geocoder,
            observer: None,
            ticket: AtomicU64::new(0),
        }
    }

    /// Wire the production geocoder from configuration.
    pub fn from_config(store: Arc<EventStore>, config: &Config) -> Self {
        let client = GeocodeClient::new(&config.geocoder_base_url, &config.geocoder_user_agent);
        Self::new(store, Arc::new(client))
    }

    pub fn with_observer(mut self, observer: Arc<dyn FilterObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run one filter invocation against the current store snapshot.
    pub async fn run(&self, criteria: FilterCriteria) -> Invocation {
        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = self.store.snapshot();
        let mut validated = criteria::validate(&criteria);

        // Radius stage: one resolution per invocation, and the only await.
        let mut center: Option<(GeoPoint, f64)> = None;
        if let Some(request) = validated.radius_request.take() {
            match self.geocoder.resolve(&request.address).await {
                Ok(point) => center = Some((point, request.radius_km)),
                Err(GeocodeError::NoMatch) => {
                    validated.issues.push(FilterIssue::AddressNotFound {
                        address: request.address,
                    });
                }
                Err(err) => {
                    warn!(error = %err, "geocode resolution failed");
                    validated.issues.push(FilterIssue::GeocodeFailed {
                        message: err.to_string(),
                    });
                }
            }

            if self.ticket.load(Ordering::SeqCst) != ticket
                || self.store.epoch() != snapshot.epoch
            {
                debug!(ticket, "invocation superseded during geocode");
                return Invocation::Superseded;
            }
        }

        let result = apply_stages(&snapshot, &validated, center);
        if let Some(observer) = &self.observer {
            observer.on_result(&FilterSummary {
                criteria,
                stats: result.stats.clone(),
                issue_count: result.issues.len(),
                epoch: result.epoch,
            });
        }
        Invocation::Completed(result)
    }
}

/// Conjunction of the active predicates in one ordered pass. Pure: the same
/// snapshot and criteria always produce the same sequence.
fn apply_stages(
    snapshot: &StoreSnapshot,
    validated: &criteria::ValidatedCriteria,
    center: Option<(GeoPoint, f64)>,
) -> FilterResult {
    let mut stats = FilterStats {
        input: snapshot.events.len(),
        ..Default::default()
    };
    let needle = validated.query.as_deref().map(|q| q.to_lowercase());
    let mut records = Vec::new();

    for event in snapshot.events.iter() {
        if let Some((start, end)) = validated.date_range {
            match event.parsed_date() {
                Some(date) if date >= start && date <= end => {}
                // Unparseable dates are excluded from date-bounded results.
                _ => {
                    stats.dropped_by_date += 1;
                    continue;
                }
            }
        }

        if let Some(needle) = needle.as_deref() {
            if !text_match(event, needle) {
                stats.dropped_by_text += 1;
                continue;
            }
        }

        if let Some((point, radius_km)) = center {
            match snapshot.venues.coords_for(event) {
                Some(coords)
                    if haversine_km(point.lat, point.lon, coords.lat, coords.lon)
                        <= radius_km => {}
                // No usable coordinates fails the predicate outright.
                _ => {
                    stats.dropped_by_radius += 1;
                    continue;
                }
            }
        }

        records.push(event.clone());
    }

    stats.matched = records.len();
    debug!(?stats, "filter stages applied");

    FilterResult {
        records,
        issues: validated.issues.clone(),
        center: center.map(|(point, _)| point),
        radius_km: center.map(|(_, radius)| radius),
        stats,
        epoch: snapshot.epoch,
    }
}

/// Case-insensitive substring match over title, venue, and address. The
/// needle is already lowercased.
fn text_match(event: &EventRecord, needle: &str) -> bool {
    [&event.title, &event.venue, &event.address]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

// ===========================================================================
// Unit tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str, venue: &str, address: &str) -> EventRecord {
        EventRecord {
            title: title.into(),
            date: "2024/03/01".into(),
            time: String::new(),
            venue: venue.into(),
            address: address.into(),
            url: String::new(),
            latitude: String::new(),
            longitude: String::new(),
        }
    }

    #[test]
    fn text_match_checks_all_three_fields() {
        let e = event("Gig", "Corner Hotel", "57 Swan St, Richmond");
        assert!(text_match(&e, "gig"));
        assert!(text_match(&e, "corner"));
        assert!(text_match(&e, "richmond"));
        assert!(!text_match(&e, "fitzroy"));
    }

    #[test]
    fn text_match_tolerates_empty_fields() {
        let e = event("Gig", "", "");
        assert!(text_match(&e, "gig"));
        assert!(!text_match(&e, "hall"));
    }
}
