//! Core types for the location subsystem.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Name given to facilities the spatial index returns without a `name` tag.
pub const UNNAMED_FACILITY: &str = "Unnamed location";

/// Category given to facilities without an `amenity` tag.
pub const GENERIC_CATEGORY: &str = "service";

/// A point on the Earth's surface in signed decimal degrees.
///
/// An absent coordinate is `Option::<Coordinate>::None`; latitude and
/// longitude are always set together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Pair up two optional halves. Returns `None` unless both are present.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Some(Self { lat, lon }),
            _ => None,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

/// One point of interest found near a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub name: String,
    /// The `amenity` tag (`hospital`, `police`, ...).
    pub category: String,
    pub coordinate: Option<Coordinate>,
    /// House number, street, city and country joined with ", ". May be empty.
    pub address: String,
}

/// Flat `{ name, type, lat, lon, address }` shape used by the JSON surfaces.
impl Serialize for Facility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Facility", 5)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("type", &self.category)?;
        s.serialize_field("lat", &self.coordinate.map(|c| c.lat))?;
        s.serialize_field("lon", &self.coordinate.map(|c| c.lon))?;
        s.serialize_field("address", &self.address)?;
        s.end()
    }
}

/// Why an upstream lookup produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("service unreachable: {0}")]
    Unreachable(String),

    #[error("service rejected request with HTTP status {status}")]
    Rejected { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result of geocoding one address.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Resolved(Coordinate),
    /// The address text was empty; no request was made.
    NoInput,
    /// The service answered but had no match.
    NotFound,
    Failed(LookupError),
}

impl GeocodeOutcome {
    /// The resolved coordinate, or `None` for every other outcome.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Resolved(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for GeocodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(c) => write!(f, "resolved {}", c),
            Self::NoInput => write!(f, "no input"),
            Self::NotFound => write!(f, "not found"),
            Self::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Result of one nearby-facility search.
#[derive(Debug, Clone, PartialEq)]
pub enum FacilitySearch {
    /// At least one facility, ordered by (category, name).
    Found(Vec<Facility>),
    /// The service answered with zero elements.
    Empty,
    /// No coordinate was given; no request was made.
    Skipped,
    Failed(LookupError),
}

impl FacilitySearch {
    /// Collapse to a plain list. Everything except `Found` becomes empty.
    pub fn into_facilities(self) -> Vec<Facility> {
        match self {
            Self::Found(facilities) => facilities,
            Self::Empty | Self::Skipped | Self::Failed(_) => Vec::new(),
        }
    }
}

impl fmt::Display for FacilitySearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(facilities) => write!(f, "{} found", facilities.len()),
            Self::Empty => write!(f, "none nearby"),
            Self::Skipped => write!(f, "skipped (no coordinate)"),
            Self::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}
