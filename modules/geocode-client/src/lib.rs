pub mod error;

pub use error::{GeocodeError, Result};

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// A resolved place. Coordinates are parsed out of the API's string fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub lat: f64,
    pub lon: f64,
    pub display_name: Option<String>,
}

/// Wire format of one `/search` hit (Nominatim `format=jsonv2`).
/// Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodeClient {
    /// Build a client against a Nominatim-compatible endpoint. The public
    /// Nominatim instance requires an identifying User-Agent, so one is
    /// mandatory here.
    pub fn new(base_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(user_agent.to_string())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a free-text address to its best-ranked place.
    /// `NoMatch` when the API returns an empty result set.
    pub async fn search(&self, address: &str) -> Result<Place> {
        let endpoint = format!("{}/search", self.base_url);

        let resp = self
            .client
            .get(&endpoint)
            .query(&[("q", address), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let hits: Vec<SearchHit> = resp.json().await?;
        let hit = hits.into_iter().next().ok_or(GeocodeError::NoMatch)?;
        let place = parse_hit(hit)?;

        debug!(lat = place.lat, lon = place.lon, "geocoded address");
        Ok(place)
    }
}

fn parse_hit(hit: SearchHit) -> Result<Place> {
    let lat: f64 = hit
        .lat
        .parse()
        .map_err(|_| GeocodeError::Malformed(format!("bad latitude: {}", hit.lat)))?;
    let lon: f64 = hit
        .lon
        .parse()
        .map_err(|_| GeocodeError::Malformed(format!("bad longitude: {}", hit.lon)))?;

    Ok(Place {
        lat,
        lon,
        display_name: hit.display_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jsonv2_search_response() {
        let body = r#"[{
            "place_id": 88123,
            "lat": "-37.8136276",
            "lon": "144.9630576",
            "display_name": "Melbourne, City of Melbourne, Victoria, Australia",
            "category": "boundary"
        }]"#;

        let hits: Vec<SearchHit> = serde_json::from_str(body).unwrap();
        let place = parse_hit(hits.into_iter().next().unwrap()).unwrap();
        assert!((place.lat - -37.8136276).abs() < 1e-9);
        assert!((place.lon - 144.9630576).abs() < 1e-9);
        assert!(place.display_name.unwrap().starts_with("Melbourne"));
    }

    #[test]
    fn non_numeric_coordinate_is_malformed() {
        let hit = SearchHit {
            lat: "not-a-number".into(),
            lon: "144.9".into(),
            display_name: None,
        };
        assert!(matches!(parse_hit(hit), Err(GeocodeError::Malformed(_))));
    }
}
