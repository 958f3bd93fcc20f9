//! Runtime configuration, built once and handed to each component.

use std::time::Duration;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Amenity tags searched for when none are configured.
pub const DEFAULT_CATEGORIES: &[&str] = &["hospital", "clinic", "doctors", "police", "fire_station"];

/// Search radius in meters.
pub const DEFAULT_RADIUS_M: u32 = 3000;

#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODER_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacilityConfig {
    pub endpoint: String,
    pub timeout: Duration,
    /// `amenity` values to query, in query order.
    pub categories: Vec<String>,
    pub default_radius_m: u32,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_URL.to_string(),
            timeout: Duration::from_secs(20),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            default_radius_m: DEFAULT_RADIUS_M,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub geocoder: GeocoderConfig,
    pub facilities: FacilityConfig,
    /// Sent as `User-Agent` to both services; Nominatim's usage policy requires one.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoder: GeocoderConfig::default(),
            facilities: FacilityConfig::default(),
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("nearby-aid/{}", env!("CARGO_PKG_VERSION"))
}

/// Split a comma-separated category list, dropping blanks.
/// Falls back to [`DEFAULT_CATEGORIES`] when nothing is left.
pub fn parse_categories(raw: &str) -> Vec<String> {
    let parsed: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if parsed.is_empty() {
        DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.geocoder.timeout, Duration::from_secs(10));
        assert_eq!(config.facilities.timeout, Duration::from_secs(20));
        assert_eq!(config.facilities.default_radius_m, 3000);
        assert_eq!(
            config.facilities.categories,
            vec!["hospital", "clinic", "doctors", "police", "fire_station"]
        );
        assert!(config.user_agent.starts_with("nearby-aid/"));
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!(parse_categories("hospital, pharmacy ,,"), vec!["hospital", "pharmacy"]);
        assert_eq!(parse_categories(" , "), FacilityConfig::default().categories);
    }
}
