//! Canonical location resolution.
//!
//! Geocodes `name + extracted address` and takes the first candidate. An
//! empty candidate set is non-fatal: the raw extracted address is kept
//! verbatim and the documented fallback coordinate applies. A candidate with
//! a place id may additionally yield an official website.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use reelbites_common::{defaults, GeoPoint};

use crate::traits::{GeocodeCandidate, Geocoder};

/// Final location facts flowing into the record.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    pub address: String,
    pub location: GeoPoint,
    pub website: String,
}

/// Apply the location policy over any [`Geocoder`].
pub async fn resolve_location(
    geocoder: &dyn Geocoder,
    name: &str,
    extracted_address: &str,
    extracted_website: &str,
) -> ResolvedLocation {
    let query = format!("{name} {extracted_address}");
    let candidates = match geocoder.geocode(&query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(query = query.as_str(), error = %e, "Geocoding failed, using extracted address");
            Vec::new()
        }
    };

    let Some(first) = candidates.into_iter().next() else {
        warn!(
            query = query.as_str(),
            "No geocode candidates, falling back to extracted address + default coordinate"
        );
        return ResolvedLocation {
            address: extracted_address.to_string(),
            location: defaults::FALLBACK_COORD,
            website: extracted_website.to_string(),
        };
    };

    let mut website = extracted_website.to_string();
    if let Some(place_id) = first.place_id.as_deref() {
        match geocoder.website(place_id).await {
            Ok(Some(official)) if !official.is_empty() => website = official,
            Ok(_) => {}
            Err(e) => warn!(place_id, error = %e, "Website lookup failed, continuing without"),
        }
    }

    info!(
        address = first.formatted_address.as_str(),
        lat = first.location.lat,
        lng = first.location.lng,
        "Location resolved"
    );

    ResolvedLocation {
        address: first.formatted_address,
        location: first.location,
        website,
    }
}

// ---------------------------------------------------------------------------
// Google Maps implementation
// ---------------------------------------------------------------------------

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const PLACE_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    website: Option<String>,
}

pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        let resp = self
            .client
            .get(GEOCODE_URL)
            .query(&[("address", query), ("key", &self.api_key)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("geocode API error ({status})"));
        }

        let parsed: GeocodeResponse = resp.json().await?;
        Ok(parsed
            .results
            .into_iter()
            .map(|r| GeocodeCandidate {
                formatted_address: r.formatted_address,
                location: GeoPoint {
                    lat: r.geometry.location.lat,
                    lng: r.geometry.location.lng,
                },
                place_id: r.place_id,
            })
            .collect())
    }

    async fn website(&self, place_id: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(PLACE_DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("fields", "website"),
                ("key", &self.api_key),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("place details API error ({status})"));
        }

        let parsed: PlaceDetailsResponse = resp.json().await?;
        Ok(parsed.result.and_then(|r| r.website))
    }
}
