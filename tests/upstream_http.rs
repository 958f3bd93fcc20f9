//! Integration tests for the `ureq` transport against local mock services.
//!
//! `wiremock` stands in for Nominatim and Overpass so no real network
//! traffic is made. The components are blocking, so each call runs on
//! Tokio's blocking pool while the mock server serves on the runtime.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nearby_aid::config::{Config, FacilityConfig, GeocoderConfig};
use nearby_aid::location::{
    AddressResolver, Coordinate, FacilityLocator, FacilitySearch, GeocodeOutcome, LocationPipeline,
    LookupError, RawLocation, UreqTransport,
};

const UA: &str = "nearby-aid-test/0.1";

fn geocoder_at(base: &str) -> AddressResolver {
    let config = GeocoderConfig {
        endpoint: format!("{}/search", base),
        timeout: Duration::from_secs(5),
    };
    AddressResolver::new(Arc::new(UreqTransport::new()), config, UA)
}

fn locator_at(base: &str) -> FacilityLocator {
    let config = FacilityConfig {
        endpoint: format!("{}/api/interpreter", base),
        timeout: Duration::from_secs(5),
        ..FacilityConfig::default()
    };
    FacilityLocator::new(Arc::new(UreqTransport::new()), config, UA)
}

async fn geocode(base: String, address: &'static str) -> GeocodeOutcome {
    tokio::task::spawn_blocking(move || geocoder_at(&base).resolve(address))
        .await
        .expect("geocoder task panicked")
}

async fn search(base: String, at: Coordinate) -> FacilitySearch {
    tokio::task::spawn_blocking(move || locator_at(&base).find_nearby(Some(at), 3000))
        .await
        .expect("locator task panicked")
}

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn geocoder_sends_single_limited_query_with_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "12 Main St, Springfield"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", UA))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "39.7817", "lon": "-89.6501", "display_name": "12 Main St, Springfield, IL"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = geocode(server.uri(), "12 Main St, Springfield").await;
    assert_eq!(outcome, GeocodeOutcome::Resolved(Coordinate::new(39.7817, -89.6501)));
}

#[tokio::test(flavor = "multi_thread")]
async fn geocoder_empty_array_is_unresolved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let outcome = geocode(server.uri(), "Nowhere Lane").await;
    assert_eq!(outcome, GeocodeOutcome::NotFound);
    assert_eq!(outcome.coordinate(), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn geocoder_server_error_is_unresolved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let outcome = geocode(server.uri(), "Oslo").await;
    assert_eq!(outcome, GeocodeOutcome::Failed(LookupError::Rejected { status: 503 }));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_address_never_reaches_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(geocode(server.uri(), "").await, GeocodeOutcome::NoInput);
}

#[test]
fn geocoder_connection_refused_is_unresolved() {
    let outcome = geocoder_at("http://127.0.0.1:1").resolve("Oslo");
    assert!(
        matches!(outcome, GeocodeOutcome::Failed(LookupError::Unreachable(_))),
        "got {outcome:?}"
    );
    assert_eq!(outcome.coordinate(), None);
}

// ---------------------------------------------------------------------------
// Facility locator
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn locator_posts_query_and_sorts_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .and(header("user-agent", UA))
        .and(body_string_contains("[out:json];"))
        .and(body_string_contains(
            r#"node["amenity"="fire_station"](around:3000,-33.86,151.21);"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [
                {"type": "node", "id": 7, "lat": -33.861, "lon": 151.212,
                 "tags": {"amenity": "police", "name": "The Rocks Police"}},
                {"type": "node", "id": 8, "lat": -33.868, "lon": 151.213,
                 "tags": {"amenity": "hospital", "addr:street": "Macquarie Street"}},
                {"type": "node", "id": 9, "lat": -33.870, "lon": 151.208,
                 "tags": {"amenity": "clinic", "name": "CBD Medical"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let facilities = search(server.uri(), Coordinate::new(-33.86, 151.21))
        .await
        .into_facilities();

    let order: Vec<(&str, &str)> = facilities
        .iter()
        .map(|f| (f.category.as_str(), f.name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("clinic", "CBD Medical"),
            ("hospital", "Unnamed location"),
            ("police", "The Rocks Police"),
        ]
    );
    assert_eq!(facilities[1].address, "Macquarie Street");
}

#[tokio::test(flavor = "multi_thread")]
async fn locator_malformed_body_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let result = search(server.uri(), Coordinate::new(0.0, 0.0)).await;
    assert!(matches!(result, FacilitySearch::Failed(LookupError::Malformed(_))), "got {result:?}");
    assert!(result.into_facilities().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn locator_gateway_timeout_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let result = search(server.uri(), Coordinate::new(0.0, 0.0)).await;
    assert_eq!(result, FacilitySearch::Failed(LookupError::Rejected { status: 504 }));
}

#[test]
fn locator_connection_refused_is_empty() {
    let result = locator_at("http://127.0.0.1:1").find_nearby(Some(Coordinate::new(1.0, 2.0)), 3000);
    assert!(matches!(result, FacilitySearch::Failed(LookupError::Unreachable(_))), "got {result:?}");
    assert!(result.into_facilities().is_empty());
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_geocodes_then_searches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "1 Rue de Rivoli, Paris, France"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "48.8566", "lon": "2.3522"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .and(body_string_contains("(around:3000,48.8566,2.3522)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [{"lat": 48.857, "lon": 2.351, "tags": {"amenity": "police", "name": "Commissariat"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let resolution = tokio::task::spawn_blocking(move || {
        let mut config = Config::default();
        config.geocoder.endpoint = format!("{}/search", base);
        config.facilities.endpoint = format!("{}/api/interpreter", base);
        config.user_agent = UA.to_string();
        let pipeline = LocationPipeline::from_config(&config);
        pipeline.run(&RawLocation {
            latitude: None,
            longitude: None,
            address: "1 Rue de Rivoli".into(),
            city: "Paris".into(),
            country: "France".into(),
        })
    })
    .await
    .expect("pipeline task panicked");

    assert_eq!(resolution.coordinate, Some(Coordinate::new(48.8566, 2.3522)));
    assert_eq!(resolution.facilities.len(), 1);
    assert_eq!(resolution.facilities[0].name, "Commissariat");
}
