//! Filter criteria as the user supplied them, and the validation that
//! decides which stages are active for an invocation.
//!
//! Every field is optional raw text — a snapshot of the form inputs.
//! Validation never fails the whole invocation: a stage with incomplete or
//! malformed inputs is reported and left inactive (pass-through) while the
//! other stages still apply.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gigmap_common::parse_event_date;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Raw filter inputs for one invocation. `None` and blank text both mean
/// "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub address: Option<String>,
    pub radius_km: Option<String>,
    pub query: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self.end_date = Some(end.into());
        self
    }

    pub fn with_radius(mut self, address: impl Into<String>, radius_km: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self.radius_km = Some(radius_km.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// User-facing problems with the supplied criteria. Each one inactivates a
/// single stage for the invocation; none of them aborts the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum FilterIssue {
    #[error("both a start and an end date are required")]
    IncompleteDateRange,

    #[error("unrecognised date: {value}")]
    BadDateBound { value: String },

    #[error("radius must be a number of kilometres: {value}")]
    BadRadius { value: String },

    #[error("an address is required to filter by radius")]
    MissingAddress,

    #[error("unable to find location: {address}")]
    AddressNotFound { address: String },

    #[error("address lookup failed: {message}")]
    GeocodeFailed { message: String },
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// The radius stage's inputs once validated, before geocoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusRequest {
    pub address: String,
    pub radius_km: f64,
}

/// Criteria after validation: each stage either active with typed inputs or
/// absent, plus the issues to surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedCriteria {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub radius_request: Option<RadiusRequest>,
    pub query: Option<String>,
    pub issues: Vec<FilterIssue>,
}

fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Decide which stages are active. The radius value is checked before any
/// address handling so a bad radius never reaches the geocoder.
pub fn validate(criteria: &FilterCriteria) -> ValidatedCriteria {
    let mut out = ValidatedCriteria::default();

    // Date range: inclusive bounds, both required.
    match (supplied(&criteria.start_date), supplied(&criteria.end_date)) {
        (None, None) => {}
        (Some(start), Some(end)) => {
            let parsed_start = parse_event_date(start);
            let parsed_end = parse_event_date(end);
            for (raw, parsed) in [(start, parsed_start), (end, parsed_end)] {
                if parsed.is_none() {
                    out.issues.push(FilterIssue::BadDateBound { value: raw.to_string() });
                }
            }
            if let (Some(start), Some(end)) = (parsed_start, parsed_end) {
                out.date_range = Some((start, end));
            }
        }
        _ => out.issues.push(FilterIssue::IncompleteDateRange),
    }

    // Radius: either input present engages the stage's validation.
    let address = supplied(&criteria.address);
    let radius = supplied(&criteria.radius_km);
    if address.is_some() || radius.is_some() {
        let parsed_radius = radius.and_then(|r| r.parse::<f64>().ok()).filter(|r| *r >= 0.0);
        match parsed_radius {
            None => out.issues.push(FilterIssue::BadRadius {
                value: radius.unwrap_or_default().to_string(),
            }),
            Some(radius_km) => match address {
                None => out.issues.push(FilterIssue::MissingAddress),
                Some(address) => {
                    out.radius_request = Some(RadiusRequest {
                        address: address.to_string(),
                        radius_km,
                    });
                }
            },
        }
    }

    // Text query: blank is a no-op, never an error.
    out.query = supplied(&criteria.query).map(str::to_string);

    out
}

// ===========================================================================
// Unit tests
// ===========================================================================
