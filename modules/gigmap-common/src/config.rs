use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Nominatim-compatible geocoding endpoint.
    pub geocoder_base_url: String,

    /// User-Agent sent to the geocoder. The public Nominatim instance
    /// rejects anonymous clients.
    pub geocoder_user_agent: String,

    /// Trailing region suffix stripped from addresses in the grouped view,
    /// e.g. ", Melbourne VIC". The map view keeps the full address.
    pub address_strip_suffix: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// sensible defaults for everything.
    pub fn from_env() -> Self {
        Self {
            geocoder_base_url: env::var("GIGMAP_GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            geocoder_user_agent: env::var("GIGMAP_GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| "gigmap/0.1".to_string()),
            address_strip_suffix: env::var("GIGMAP_ADDRESS_SUFFIX").ok(),
        }
    }
}
