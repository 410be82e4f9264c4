use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// --- Geo Types ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Haversine great-circle distance between two lat/lon points in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

// --- Date parsing ---

/// Parse a calendar date in the canonical `YYYY/MM/DD` form, accepting
/// `YYYY-MM-DD` as a compatibility format. Anything else is `None`.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .ok()
}

fn parse_coord(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

// --- Records ---

/// One row of the external event table. Every field is kept as the text the
/// source supplied; dates and coordinates are parsed on demand so a
/// malformed field only costs the record the stages that need it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "Event_Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time", default)]
    pub time: String,
    #[serde(rename = "Venue", default)]
    pub venue: String,
    #[serde(rename = "Address", default)]
    pub address: String,
    #[serde(rename = "url", default)]
    pub url: String,
    #[serde(rename = "Latitude", default)]
    pub latitude: String,
    #[serde(rename = "Longitude", default)]
    pub longitude: String,
}

impl EventRecord {
    /// The record's calendar date, if the text parses. `None` excludes the
    /// record from date-bounded results only.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_event_date(&self.date)
    }

    /// Coordinates carried on the record itself. Requires both fields to be
    /// numeric; empty or junk text yields `None`.
    pub fn own_coords(&self) -> Option<GeoPoint> {
        let lat = parse_coord(&self.latitude)?;
        let lon = parse_coord(&self.longitude)?;
        Some(GeoPoint { lat, lon })
    }
}

/// One row of the venue coordinate table. Joined against events by venue
/// name when an event row carries no usable coordinates of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    #[serde(rename = "Venue")]
    pub venue: String,
    #[serde(rename = "Latitude", default)]
    pub latitude: String,
    #[serde(rename = "Longitude", default)]
    pub longitude: String,
}

impl VenueRecord {
    pub fn coords(&self) -> Option<GeoPoint> {
        let lat = parse_coord(&self.latitude)?;
        let lon = parse_coord(&self.longitude)?;
        Some(GeoPoint { lat, lon })
    }
}

// ===========================================================================
// Unit tests
// ===========================================================================
