//! Nearby emergency and medical facilities via the Overpass API.
//!
//! One POST per search. Results are normalized into [`Facility`] values and
//! sorted by `(category, name)` so the same upstream data always renders in
//! the same order.

use super::transport::{HttpRequest, Transport};
use super::types::{
    Coordinate, Facility, FacilitySearch, LookupError, GENERIC_CATEGORY, UNNAMED_FACILITY,
};
use crate::config::FacilityConfig;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

/// Address tags joined into [`Facility::address`], in display order.
const ADDRESS_TAGS: &[&str] = &["addr:housenumber", "addr:street", "addr:city", "addr:country"];

// ─── Wire format ────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Value>,
}

/// One element, read field by field so an odd value only affects that field.
#[derive(Deserialize, Debug, Default)]
struct OverpassElement {
    #[serde(default, deserialize_with = "finite_number")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "finite_number")]
    lon: Option<f64>,
    #[serde(default, deserialize_with = "string_tags")]
    tags: HashMap<String, String>,
}

/// Anything but a finite JSON number reads as absent.
fn finite_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

/// Keeps string-valued tags and drops the rest.
fn string_tags<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<HashMap<String, String>, D::Error> {
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            _ => None,
        })
        .collect())
}

impl OverpassElement {
    /// A non-object element reads as one with no fields.
    fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    fn into_facility(self) -> Facility {
        let coordinate = Coordinate::from_parts(self.lat, self.lon);
        let mut tags = self.tags;

        let name = tags
            .remove("name")
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED_FACILITY.to_string());
        let category = tags
            .remove("amenity")
            .unwrap_or_else(|| GENERIC_CATEGORY.to_string());
        let address = ADDRESS_TAGS
            .iter()
            .filter_map(|key| tags.get(*key))
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        Facility {
            name,
            category,
            coordinate,
            address,
        }
    }
}

// ─── Query construction ─────────────────────────────────────────

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Overpass QL for every `amenity` in `categories` within `radius_m` of `at`.
pub fn build_query(at: Coordinate, radius_m: u32, categories: &[String]) -> String {
    let mut query = String::from("[out:json];\n(\n");
    for category in categories {
        let _ = writeln!(
            query,
            "  node[\"amenity\"=\"{}\"](around:{},{},{});",
            quote(category),
            radius_m,
            at.lat,
            at.lon
        );
    }
    query.push_str(");\nout body;\n");
    query
}

/// Parse an interpreter response and order the result.
fn parse_interpreter_body(body: &str) -> FacilitySearch {
    let response: OverpassResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return FacilitySearch::Failed(LookupError::Malformed(e.to_string())),
    };
    if response.elements.is_empty() {
        return FacilitySearch::Empty;
    }

    let mut facilities: Vec<Facility> = response
        .elements
        .into_iter()
        .map(|element| OverpassElement::from_value(element).into_facility())
        .collect();
    sort_facilities(&mut facilities);
    FacilitySearch::Found(facilities)
}

/// Stable sort by category, then name. Ties keep upstream order.
pub fn sort_facilities(facilities: &mut [Facility]) {
    facilities.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.name.cmp(&b.name))
    });
}

// ─── Locator ────────────────────────────────────────────────────

pub struct FacilityLocator {
    transport: Arc<dyn Transport>,
    config: FacilityConfig,
    user_agent: String,
}

impl FacilityLocator {
    pub fn new(transport: Arc<dyn Transport>, config: FacilityConfig, user_agent: &str) -> Self {
        Self {
            transport,
            config,
            user_agent: user_agent.to_string(),
        }
    }

    pub fn default_radius_m(&self) -> u32 {
        self.config.default_radius_m
    }

    /// Search around `at`. An absent coordinate short-circuits without a request.
    pub fn find_nearby(&self, at: Option<Coordinate>, radius_m: u32) -> FacilitySearch {
        let Some(at) = at else {
            return FacilitySearch::Skipped;
        };

        let query = build_query(at, radius_m, &self.config.categories);
        let request = HttpRequest::post(&self.config.endpoint, query, &self.user_agent, self.config.timeout);

        match self.transport.send(&request) {
            Ok(body) => parse_interpreter_body(&body),
            Err(e) => FacilitySearch::Failed(e),
        }
    }
}
