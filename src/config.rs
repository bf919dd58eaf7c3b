use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::backend::geocode::{GeocodeParams, GOOGLE_GEOCODE_ENDPOINT};

/// What to do with blobs that were uploaded before a sibling upload failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackPolicy {
    /// Leave them in storage, unreferenced
    #[default]
    Keep,
    /// Delete them, best effort
    DeleteUploaded,
}

impl FromStr for RollbackPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(RollbackPolicy::Keep),
            "delete" => Ok(RollbackPolicy::DeleteUploaded),
            other => Err(anyhow!("expected 'keep' or 'delete', got '{other}'")),
        }
    }
}

impl Display for RollbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollbackPolicy::Keep => f.write_str("keep"),
            RollbackPolicy::DeleteUploaded => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub geocode_api_key: Option<String>,
    pub geolocation_enabled: bool,
    pub geocode_endpoint: String,
    pub http_timeout: Duration,
    pub image_prefix: String,
    pub upload_rollback: RollbackPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocode_api_key: None,
            geolocation_enabled: true,
            geocode_endpoint: GOOGLE_GEOCODE_ENDPOINT.to_string(),
            http_timeout: Duration::from_secs(30),
            image_prefix: "images/".to_string(),
            upload_rollback: RollbackPolicy::Keep,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let geocode_api_key = var("GEOCODE_API_KEY").filter(|key| !key.trim().is_empty());
        let geolocation_enabled = try_load("GEOLOCATION_ENABLED", "true")?;
        let geocode_endpoint = var("GEOCODE_ENDPOINT").unwrap_or(defaults.geocode_endpoint);
        let timeout_secs: u64 = try_load("HTTP_TIMEOUT_SECS", "30")?;
        let image_prefix = var("IMAGE_PREFIX").unwrap_or(defaults.image_prefix);
        let upload_rollback = try_load("UPLOAD_ROLLBACK", "keep")?;

        Ok(Self {
            geocode_api_key,
            geolocation_enabled,
            geocode_endpoint,
            http_timeout: Duration::from_secs(timeout_secs),
            image_prefix,
            upload_rollback,
        })
    }

    /// Geocoding parameters, when lookups are enabled and a key is present
    pub fn geocode_params(&self) -> Option<GeocodeParams> {
        if !self.geolocation_enabled {
            return None;
        }

        match &self.geocode_api_key {
            Some(api_key) => Some(GeocodeParams {
                endpoint: self.geocode_endpoint.clone(),
                api_key: api_key.clone(),
                timeout: self.http_timeout,
            }),
            None => {
                warn!("GEOCODE_API_KEY not set, geolocation lookup disabled");
                None
            }
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow!("{e}")
        })
        .with_context(|| format!("Environment variable {key} is misconfigured"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_policy_parses_both_spellings() {
        assert_eq!("keep".parse::<RollbackPolicy>().unwrap(), RollbackPolicy::Keep);
        assert_eq!(
            " Delete ".parse::<RollbackPolicy>().unwrap(),
            RollbackPolicy::DeleteUploaded
        );
        assert!("purge".parse::<RollbackPolicy>().is_err());
    }

    #[test]
    fn geocoding_needs_key_and_flag() {
        let mut config = Config::default();
        assert!(config.geocode_params().is_none());

        config.geocode_api_key = Some("k".to_string());
        let params = config.geocode_params().unwrap();
        assert_eq!(params.api_key, "k");
        assert_eq!(params.endpoint, GOOGLE_GEOCODE_ENDPOINT);

        config.geolocation_enabled = false;
        assert!(config.geocode_params().is_none());
    }
}
