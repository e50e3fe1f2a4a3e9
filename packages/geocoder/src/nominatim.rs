//! Nominatim / OpenStreetMap reverse geocoder client.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum on
//! the public instance, and requests must carry an identifying
//! `User-Agent`. Both are enforced here rather than left to the caller.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use std::time::Duration;

use async_trait::async_trait;
use nearby_listing_models::Coordinate;

use crate::rate_limit::RateLimiter;
use crate::service_registry::GeocodingService;
use crate::{GeocodeError, ReverseGeocoder};

/// Address fields checked for a locality name, most specific first.
const LOCALITY_FIELDS: &[&str] = &[
    "city",
    "town",
    "village",
    "municipality",
    "county",
    "state",
];

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl NominatimGeocoder {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        rate_limit: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            limiter: RateLimiter::new(rate_limit),
        })
    }

    /// Creates a client from a registry entry.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_service(service: &GeocodingService) -> Result<Self, GeocodeError> {
        log::debug!(
            "Configuring {} at {} ({} ms between requests)",
            service.name,
            service.base_url(),
            service.rate_limit().as_millis()
        );
        Self::new(
            service.base_url(),
            &service.user_agent,
            service.timeout(),
            service.rate_limit(),
        )
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, GeocodeError> {
        self.limiter.wait().await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Parses a Nominatim reverse response into a locality name.
///
/// Nominatim answers "nothing here" (e.g. open ocean) with a 200 and an
/// `error` member, which is reported as `Ok(None)`.
fn parse_response(body: &serde_json::Value) -> Result<Option<String>, GeocodeError> {
    let object = body.as_object().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an object".to_string(),
    })?;

    if let Some(error) = object.get("error") {
        log::debug!("Nominatim returned no result: {error}");
        return Ok(None);
    }

    let Some(address) = object.get("address").and_then(serde_json::Value::as_object) else {
        return Ok(object
            .get("name")
            .and_then(serde_json::Value::as_str)
            .filter(|name| !name.is_empty())
            .map(String::from));
    };

    Ok(LOCALITY_FIELDS
        .iter()
        .find_map(|field| address.get(*field).and_then(serde_json::Value::as_str))
        .filter(|name| !name.is_empty())
        .map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_city_from_address() {
        let body = serde_json::json!({
            "display_name": "Santa Fe, Bogotá, Bogotá Distrito Capital, Colombia",
            "address": {
                "suburb": "Santa Fe",
                "city": "Bogotá",
                "state": "Bogotá Distrito Capital",
                "country": "Colombia"
            }
        });
        assert_eq!(parse_response(&body).unwrap().as_deref(), Some("Bogotá"));
    }

    #[test]
    fn falls_back_to_town_then_state() {
        let body = serde_json::json!({
            "address": { "town": "Chía", "state": "Cundinamarca" }
        });
        assert_eq!(parse_response(&body).unwrap().as_deref(), Some("Chía"));

        let body = serde_json::json!({
            "address": { "state": "Amazonas", "country": "Colombia" }
        });
        assert_eq!(parse_response(&body).unwrap().as_deref(), Some("Amazonas"));
    }

    #[test]
    fn error_member_means_no_result() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn address_without_locality_is_none() {
        let body = serde_json::json!({ "address": { "country": "Colombia" } });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn non_object_is_a_parse_error() {
        let body = serde_json::json!([1, 2, 3]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn builds_from_registry() {
        let service = crate::service_registry::all_services()
            .into_iter()
            .next()
            .unwrap();
        let geocoder = NominatimGeocoder::from_service(&service).unwrap();
        assert_eq!(geocoder.base_url, service.base_url());
        assert_eq!(geocoder.limiter.min_interval(), service.rate_limit());
    }
}
