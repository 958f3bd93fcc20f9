//! Location pipeline: supplied coordinates → geocoded address → nearby facilities.
//!
//! Flow:  raw lat/lon (if both parse) → else geocode "address, city, country" → search around result
//!
//! Every step has a fallback; the pipeline never returns an error.

use super::facilities::FacilityLocator;
use super::geocoder::AddressResolver;
use super::transport::{Transport, UreqTransport};
use super::types::{Coordinate, Facility, FacilitySearch, GeocodeOutcome};
use crate::config::Config;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Location fields exactly as a registration form submits them.
#[derive(Debug, Clone, Default)]
pub struct RawLocation {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub address: String,
    pub city: String,
    pub country: String,
}

/// Where the final coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSource {
    Supplied,
    Geocoded,
    Unavailable,
}

impl fmt::Display for CoordinateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supplied => write!(f, "supplied"),
            Self::Geocoded => write!(f, "geocoded"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateResolution {
    pub coordinate: Option<Coordinate>,
    pub source: CoordinateSource,
    /// Set only when the geocoder was consulted.
    pub geocode: Option<GeocodeOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub coordinate: Option<Coordinate>,
    pub source: CoordinateSource,
    pub facilities: Vec<Facility>,
}

/// Parse one coordinate half. Blank, non-numeric and non-finite text all mean absent.
pub fn parse_degrees(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Join the non-empty address lines with ", " in address, city, country order.
pub fn compose_geocode_query(address: &str, city: &str, country: &str) -> String {
    [address, city, country]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ties the geocoder and the facility locator together.
pub struct LocationPipeline {
    geocoder: AddressResolver,
    locator: FacilityLocator,
}

impl LocationPipeline {
    /// Build both components over one shared transport.
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            geocoder: AddressResolver::new(transport.clone(), config.geocoder.clone(), &config.user_agent),
            locator: FacilityLocator::new(transport, config.facilities.clone(), &config.user_agent),
        }
    }

    /// Pipeline talking to the real services.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(UreqTransport::new()))
    }

    pub fn geocoder(&self) -> &AddressResolver {
        &self.geocoder
    }

    pub fn locator(&self) -> &FacilityLocator {
        &self.locator
    }

    /// Steps 1 and 2: supplied coordinates win, otherwise geocode the address lines.
    pub fn resolve_coordinate(&self, raw: &RawLocation) -> CoordinateResolution {
        let supplied = Coordinate::from_parts(
            parse_degrees(raw.latitude.as_deref()),
            parse_degrees(raw.longitude.as_deref()),
        );
        if let Some(coordinate) = supplied {
            return CoordinateResolution {
                coordinate: Some(coordinate),
                source: CoordinateSource::Supplied,
                geocode: None,
            };
        }

        let query = compose_geocode_query(&raw.address, &raw.city, &raw.country);
        if query.is_empty() {
            return CoordinateResolution {
                coordinate: None,
                source: CoordinateSource::Unavailable,
                geocode: None,
            };
        }

        let outcome = self.geocoder.resolve(&query);
        let coordinate = outcome.coordinate();
        CoordinateResolution {
            coordinate,
            source: if coordinate.is_some() {
                CoordinateSource::Geocoded
            } else {
                CoordinateSource::Unavailable
            },
            geocode: Some(outcome),
        }
    }

    /// Step 3 with the configured default radius, keeping the tagged outcome.
    pub fn search(&self, coordinate: Option<Coordinate>) -> FacilitySearch {
        self.locator
            .find_nearby(coordinate, self.locator.default_radius_m())
    }

    /// Step 3, collapsed to a plain list.
    pub fn nearby(&self, coordinate: Option<Coordinate>) -> Vec<Facility> {
        self.search(coordinate).into_facilities()
    }

    /// All three steps.
    pub fn run(&self, raw: &RawLocation) -> Resolution {
        let resolved = self.resolve_coordinate(raw);
        Resolution {
            coordinate: resolved.coordinate,
            source: resolved.source,
            facilities: self.nearby(resolved.coordinate),
        }
    }
}
