//! Address → coordinate lookup via OpenStreetMap Nominatim.

use super::transport::{HttpRequest, Transport};
use super::types::{Coordinate, GeocodeOutcome, LookupError};
use crate::config::GeocoderConfig;
use serde::Deserialize;
use std::sync::Arc;

/// Nominatim encodes coordinates as strings; accept bare numbers as well.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Degrees {
    Text(String),
    Number(f64),
}

impl Degrees {
    fn parse(&self, field: &str) -> Result<f64, LookupError> {
        let value = match self {
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| LookupError::Malformed(format!("non-numeric {}: '{}'", field, s)))?,
            Self::Number(n) => *n,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(LookupError::Malformed(format!("non-finite {}", field)))
        }
    }
}

#[derive(Deserialize, Debug)]
struct NominatimHit {
    lat: Degrees,
    lon: Degrees,
}

/// Turn a Nominatim search body into an outcome. Only the first hit is read.
fn parse_search_body(body: &str) -> GeocodeOutcome {
    let hits: Vec<serde_json::Value> = match serde_json::from_str(body) {
        Ok(hits) => hits,
        Err(e) => return GeocodeOutcome::Failed(LookupError::Malformed(e.to_string())),
    };
    let Some(first) = hits.into_iter().next() else {
        return GeocodeOutcome::NotFound;
    };
    let first: NominatimHit = match serde_json::from_value(first) {
        Ok(hit) => hit,
        Err(e) => return GeocodeOutcome::Failed(LookupError::Malformed(e.to_string())),
    };
    match (first.lat.parse("lat"), first.lon.parse("lon")) {
        (Ok(lat), Ok(lon)) => GeocodeOutcome::Resolved(Coordinate::new(lat, lon)),
        (Err(e), _) | (_, Err(e)) => GeocodeOutcome::Failed(e),
    }
}

/// Resolves free-text addresses with a single bounded request.
pub struct AddressResolver {
    transport: Arc<dyn Transport>,
    config: GeocoderConfig,
    user_agent: String,
}

impl AddressResolver {
    pub fn new(transport: Arc<dyn Transport>, config: GeocoderConfig, user_agent: &str) -> Self {
        Self {
            transport,
            config,
            user_agent: user_agent.to_string(),
        }
    }

    /// Geocode `address`. Never fails: every problem is folded into the outcome.
    pub fn resolve(&self, address: &str) -> GeocodeOutcome {
        let address = address.trim();
        if address.is_empty() {
            return GeocodeOutcome::NoInput;
        }

        let request = HttpRequest::get(&self.config.endpoint, &self.user_agent, self.config.timeout)
            .with_query("q", address)
            .with_query("format", "json")
            .with_query("limit", "1");

        match self.transport.send(&request) {
            Ok(body) => parse_search_body(&body),
            Err(e) => GeocodeOutcome::Failed(e),
        }
    }
}
