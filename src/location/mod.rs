//! Location subsystem for Nearby Aid.
//!
//! Address geocoding (Nominatim), nearby facility search (Overpass),
//! and the pipeline that decides which of them to call.

pub mod facilities;
pub mod geocoder;
pub mod resolver;
pub mod transport;
pub mod types;

pub use facilities::FacilityLocator;
pub use geocoder::AddressResolver;
pub use resolver::{CoordinateSource, LocationPipeline, RawLocation, Resolution};
pub use transport::{Transport, UreqTransport};
pub use types::{Coordinate, Facility, FacilitySearch, GeocodeOutcome, LookupError};
