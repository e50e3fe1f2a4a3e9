//! Compile-time registry of reverse-geocoding service configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`] and
//! [`enabled_services`].

use std::time::Duration;

use serde::Deserialize;

/// Environment variable that overrides the Nominatim endpoint (e.g. a
/// self-hosted instance).
pub const NOMINATIM_URL_ENV: &str = "NOMINATIM_URL";

/// A reverse-geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be used.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fixed client identifier sent as the `User-Agent` header.
    pub user_agent: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim / `OpenStreetMap` reverse endpoint.
    Nominatim {
        /// API URL (e.g., `"https://nominatim.openstreetmap.org/reverse"`).
        base_url: String,
        /// Minimum delay between requests in milliseconds.
        rate_limit_ms: u64,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_ms() -> u64 {
    10_000
}

impl GeocodingService {
    /// Returns the provider's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim { base_url, .. } => base_url,
        }
    }

    /// Minimum spacing between consecutive requests.
    #[must_use]
    pub const fn rate_limit(&self) -> Duration {
        match &self.provider {
            ProviderConfig::Nominatim { rate_limit_ms, .. } => {
                Duration::from_millis(*rate_limit_ms)
            }
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Replaces the base URL with `NOMINATIM_URL` if that variable is set
    /// and non-empty.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(NOMINATIM_URL_ENV)
            && !url.trim().is_empty()
        {
            log::info!("Using {NOMINATIM_URL_ENV}={url} for {}", self.id);
            match &mut self.provider {
                ProviderConfig::Nominatim { base_url, .. } => *base_url = url.trim().to_string(),
            }
        }
        self
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[("nominatim", include_str!("../services/nominatim.toml"))];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 1;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services with environment overrides applied.
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    all_services()
        .into_iter()
        .filter(|s| s.enabled)
        .map(GeocodingService::with_env_overrides)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_services() {
        let services = all_services();
        assert_eq!(services.len(), EXPECTED_SERVICE_COUNT);
    }

    #[test]
    fn service_ids_are_unique() {
        let services = all_services();
        let mut seen = BTreeSet::new();
        for svc in &services {
            assert!(seen.insert(&svc.id), "Duplicate service ID: {}", svc.id);
        }
    }

    #[test]
    fn all_services_have_required_fields() {
        for svc in &all_services() {
            assert!(!svc.id.is_empty(), "Service has empty id");
            assert!(!svc.name.is_empty(), "Service {} has empty name", svc.id);
            assert!(!svc.user_agent.is_empty(), "Service {} has empty user_agent", svc.id);
            assert!(!svc.base_url().is_empty(), "Service {} has empty base_url", svc.id);
        }
    }

    #[test]
    fn nominatim_respects_public_rate_limit() {
        let svc = all_services()
            .into_iter()
            .find(|s| s.id == "nominatim")
            .unwrap();
        assert!(svc.rate_limit() >= Duration::from_secs(1));
        assert!(svc.timeout() > Duration::ZERO);
    }
}
