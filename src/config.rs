use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{FORECAST_DAYS, OPENAI_API_BASE, OPENAI_MODEL};

/// Credentials and endpoint for the text-generation service.
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    /// `None` disables generated forecasts; templates are used instead
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: OPENAI_API_BASE.to_string(),
            model: OPENAI_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Process-wide settings, built once at start-up and handed to the services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub narrative: NarrativeConfig,
    /// Fixed seed for template selection; `None` draws from the OS
    pub forecast_seed: Option<u64>,
    pub forecast_days: u32,
    /// Replacement for the embedded city list
    pub cities_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            narrative: NarrativeConfig::default(),
            forecast_seed: None,
            forecast_days: FORECAST_DAYS,
            cities_path: None,
        }
    }
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var(&get, "PORT")? {
            config.port = port;
        }
        config.narrative.api_key = get("OPENAI_API_KEY");
        if let Some(base) = get("OPENAI_API_BASE") {
            config.narrative.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("OPENAI_MODEL") {
            config.narrative.model = model;
        }
        if let Some(secs) = parse_var::<u64, _>(&get, "NARRATIVE_TIMEOUT_SECS")? {
            if secs == 0 {
                anyhow::bail!("NARRATIVE_TIMEOUT_SECS must be positive");
            }
            config.narrative.timeout = Duration::from_secs(secs);
        }
        config.forecast_seed = parse_var(&get, "FORECAST_SEED")?;
        if let Some(days) = parse_var::<u32, _>(&get, "FORECAST_DAYS")? {
            if days == 0 {
                anyhow::bail!("FORECAST_DAYS must be positive");
            }
            config.forecast_days = days;
        }
        config.cities_path = get("CITIES_PATH").map(PathBuf::from);

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.narrative.api_key.is_none());
        assert_eq!(config.narrative.model, "gpt-4o");
        assert_eq!(config.narrative.timeout, Duration::from_secs(30));
        assert_eq!(config.forecast_days, 30);
        assert!(config.forecast_seed.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "http://localhost:9999/v1/"),
            ("NARRATIVE_TIMEOUT_SECS", "5"),
            ("FORECAST_SEED", "42"),
            ("CITIES_PATH", "/tmp/cities.json"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.narrative.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.narrative.api_base, "http://localhost:9999/v1");
        assert_eq!(config.narrative.timeout, Duration::from_secs(5));
        assert_eq!(config.forecast_seed, Some(42));
        assert_eq!(config.cities_path, Some(PathBuf::from("/tmp/cities.json")));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(config.narrative.api_key.is_none());
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config_from(&[("NARRATIVE_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("FORECAST_DAYS", "-3")]).is_err());
    }
}
