//! Configuration for the Wayfarer service
//!
//! Provider credentials are explicit fields injected into each adapter at
//! construction time. A provider whose credential is absent degrades to
//! fallback data rather than failing requests.

use crate::TravelError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Root configuration structure for the Wayfarer service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WayfarerConfig {
    /// Upstream provider credentials
    pub providers: ProvidersConfig,
    /// HTTP server settings
    pub server: ServerConfig,
    /// Cache settings
    pub cache: CacheConfig,
}

/// Per-provider credentials. `None` means "not configured".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Geoapify key, shared by geocoding, places, and routing
    pub geoapify_api_key: Option<String>,
    /// OpenWeatherMap One Call key
    pub openweather_api_key: Option<String>,
    /// Unsplash access key
    pub unsplash_access_key: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

fn default_port() -> u16 {
    8000
}

fn default_cache_location() -> String {
    "./wayfarer-cache".to_string()
}

impl Default for WayfarerConfig {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig::default(),
            server: ServerConfig {
                port: default_port(),
            },
            cache: CacheConfig {
                location: default_cache_location(),
            },
        }
    }
}

impl ProvidersConfig {
    /// Enumerate providers with whether a credential is configured,
    /// for the startup log.
    #[must_use]
    pub fn credential_summary(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("geoapify", self.geoapify_api_key.is_some()),
            ("openweather", self.openweather_api_key.is_some()),
            ("unsplash", self.unsplash_access_key.is_some()),
            ("wikipedia", true), // no credential required
        ]
    }
}

impl WayfarerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            providers: ProvidersConfig {
                geoapify_api_key: env_key("GEOAPIFY_API_KEY"),
                openweather_api_key: env_key("OPENWEATHER_API_KEY"),
                unsplash_access_key: env_key("UNSPLASH_ACCESS_KEY"),
            },
            server: ServerConfig {
                port: default_port(),
            },
            cache: CacheConfig {
                location: default_cache_location(),
            },
        };

        if let Some(port) = env_key("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| TravelError::validation(format!("Invalid PORT value '{port}'")))?;
        }
        if let Some(location) = env_key("WAYFARER_CACHE_DIR") {
            config.cache.location = location;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        for (name, key) in [
            ("GEOAPIFY_API_KEY", &self.providers.geoapify_api_key),
            ("OPENWEATHER_API_KEY", &self.providers.openweather_api_key),
            ("UNSPLASH_ACCESS_KEY", &self.providers.unsplash_access_key),
        ] {
            if let Some(key) = key {
                if key.len() < 8 {
                    return Err(TravelError::validation(format!(
                        "{name} appears to be invalid (too short). Please check the key."
                    ))
                    .into());
                }
                if key.len() > 100 {
                    return Err(TravelError::validation(format!(
                        "{name} appears to be invalid (too long). Please check the key."
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Read an environment variable, treating empty/blank values as unset
fn env_key(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WayfarerConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.cache.location, "./wayfarer-cache");
        assert!(config.providers.geoapify_api_key.is_none());
    }

    #[test]
    fn test_validation_accepts_absent_keys() {
        let config = WayfarerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_short_key() {
        let mut config = WayfarerConfig::default();
        config.providers.geoapify_api_key = Some("abc".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_plausible_key() {
        let mut config = WayfarerConfig::default();
        config.providers.geoapify_api_key = Some("valid_api_key_123".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credential_summary_enumerates_all_providers() {
        let summary = ProvidersConfig::default().credential_summary();
        assert_eq!(summary.len(), 4);
        assert!(summary.iter().any(|(name, configured)| *name == "wikipedia" && *configured));
    }
}
