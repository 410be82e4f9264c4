// Trait abstractions for the pipeline's external collaborators.
//
// Geocoder puts address resolution behind one trait instead of a hard
// dependency on the Nominatim client. RecordSource hands over
// already-deserialized rows; the tabular format itself is the source's
// problem, not the engine's.
//
// These enable deterministic testing with mock geocoders and in-memory
// sources: no network. `cargo test` in seconds.

use anyhow::Result;
use async_trait::async_trait;

use geocode_client::{GeocodeClient, GeocodeError};
use gigmap_common::{EventRecord, GeoPoint, VenueRecord};

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-text address to a coordinate pair.
    async fn resolve(&self, address: &str) -> std::result::Result<GeoPoint, GeocodeError>;
}

#[async_trait]
impl Geocoder for GeocodeClient {
    async fn resolve(&self, address: &str) -> std::result::Result<GeoPoint, GeocodeError> {
        let place = self.search(address).await?;
        Ok(GeoPoint {
            lat: place.lat,
            lon: place.lon,
        })
    }
}

// ---------------------------------------------------------------------------
// RecordSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every event row from the external table.
    async fn events(&self) -> Result<Vec<EventRecord>>;

    /// Fetch the venue coordinate table. Sources without one return empty.
    async fn venues(&self) -> Result<Vec<VenueRecord>> {
        Ok(Vec::new())
    }
}
