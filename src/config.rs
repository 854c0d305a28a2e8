use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::carousel::DEFAULT_INTERVAL;

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding the catalogs and testimonials
    pub database_path: PathBuf,
    pub port: u16,
    /// Carousel autoplay period
    pub carousel_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let carousel_interval = match lookup("CAROUSEL_INTERVAL_MS") {
            Some(ms) => Duration::from_millis(
                ms.parse::<u64>()
                    .context("CAROUSEL_INTERVAL_MS must be a number of milliseconds")?,
            ),
            None => DEFAULT_INTERVAL,
        };
        if carousel_interval.is_zero() {
            anyhow::bail!("CAROUSEL_INTERVAL_MS must be greater than zero");
        }

        Ok(Self {
            database_path: lookup("CATALOG_DB_PATH")
                .unwrap_or_else(|| "catalog.db".to_string())
                .into(),
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            carousel_interval,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.database_path, PathBuf::from("catalog.db"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.carousel_interval, Duration::from_secs(5));
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CATALOG_DB_PATH", "/tmp/x.db"),
            ("PORT", "8080"),
            ("CAROUSEL_INTERVAL_MS", "2500"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.carousel_interval, Duration::from_millis(2500));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CAROUSEL_INTERVAL_MS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CAROUSEL_INTERVAL_MS", "soon")])).is_err());
    }
}
