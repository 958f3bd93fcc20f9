use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::location::resolver::parse_degrees;
use crate::location::{Coordinate, CoordinateSource, Facility, RawLocation};
use crate::registry::{NewRegistrant, Registrant, StoreError};

use super::state::AppState;
use super::static_files;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── Static file handlers ────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

pub async fn script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        static_files::APP_JS,
    )
        .into_response()
}

// ─── POST /register ──────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct RegisterForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub disability_type: String,
    #[serde(default)]
    pub support_needs: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Serialize)]
pub struct Confirmation {
    pub person: Registrant,
    pub coordinate_source: CoordinateSource,
    pub services: Vec<Facility>,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.full_name.trim().is_empty() {
        return Redirect::to("/").into_response();
    }

    let start = Instant::now();
    let worker = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        let raw = RawLocation {
            latitude: form.latitude,
            longitude: form.longitude,
            address: form.address.trim().to_string(),
            city: form.city.trim().to_string(),
            country: form.country.trim().to_string(),
        };
        let resolved = worker.pipeline.resolve_coordinate(&raw);

        let person = worker.store.create(NewRegistrant {
            full_name: form.full_name,
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            address: raw.address,
            city: raw.city,
            country: raw.country,
            disability_type: form.disability_type.trim().to_string(),
            support_needs: form.support_needs.trim().to_string(),
            latitude: resolved.coordinate.map(|c| c.lat),
            longitude: resolved.coordinate.map(|c| c.lon),
        })?;

        let search = worker.pipeline.search(resolved.coordinate);
        let geocode = resolved
            .geocode
            .as_ref()
            .map_or_else(|| "not attempted".to_string(), ToString::to_string);
        tracing::info!(
            id = person.id,
            source = %resolved.source,
            geocode = %geocode,
            facilities = %search,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "POST /register"
        );
        Ok::<_, StoreError>(Confirmation {
            person,
            coordinate_source: resolved.source,
            services: search.into_facilities(),
        })
    })
    .await;

    match result {
        Ok(Ok(confirmation)) => Json(confirmation).into_response(),
        Ok(Err(StoreError::MissingName)) => Redirect::to("/").into_response(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "registration not stored");
            api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "registration worker failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "registration failed").into_response()
        }
    }
}

// ─── POST /api/nearby ────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct NearbyRequest {
    #[serde(default)]
    latitude: serde_json::Value,
    #[serde(default)]
    longitude: serde_json::Value,
}

#[derive(Serialize)]
pub struct NearbyResponse {
    pub services: Vec<Facility>,
}

/// Accept numbers or numeric strings; anything else is absent.
fn degrees(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_degrees(Some(s)),
        _ => None,
    }
}

pub async fn nearby(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: NearbyRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some(at) = Coordinate::from_parts(degrees(&request.latitude), degrees(&request.longitude)) else {
        return Json(NearbyResponse { services: Vec::new() }).into_response();
    };

    let start = Instant::now();
    let worker = state.clone();
    let search = tokio::task::spawn_blocking(move || worker.pipeline.search(Some(at))).await;

    match search {
        Ok(search) => {
            tracing::info!(
                %at,
                facilities = %search,
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "POST /api/nearby"
            );
            Json(NearbyResponse {
                services: search.into_facilities(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "nearby worker failed");
            Json(NearbyResponse { services: Vec::new() }).into_response()
        }
    }
}
