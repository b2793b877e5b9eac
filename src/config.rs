//! Runtime configuration read from the environment (after `.env` is loaded).

use crate::consts::{endpoints, limits};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{key}: invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub spoonacular_key: String,
    pub spoonacular_url: String,
    pub translate_url: String,
    pub results_per_query: u32,
    pub api_language: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let results_per_query = match get("RESULTS_PER_QUERY") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(ConfigError::Invalid { key: "RESULTS_PER_QUERY", value: raw }),
            },
            None => limits::DEFAULT_RESULTS_PER_QUERY,
        };

        let timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(ConfigError::Invalid { key: "REQUEST_TIMEOUT_SECS", value: raw }),
            },
            None => limits::REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            telegram_token: required("TELOXIDE_TOKEN")?,
            spoonacular_key: required("SPOONACULAR_API_KEY")?,
            spoonacular_url: get("SPOONACULAR_BASE_URL")
                .unwrap_or_else(|| endpoints::DEFAULT_SPOONACULAR_URL.to_string()),
            translate_url: get("TRANSLATE_BASE_URL")
                .unwrap_or_else(|| endpoints::DEFAULT_TRANSLATE_URL.to_string()),
            results_per_query,
            api_language: get("RECIPE_API_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_absent() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELOXIDE_TOKEN", "tok"),
            ("SPOONACULAR_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(cfg.results_per_query, 3);
        assert_eq!(cfg.api_language, "en");
        assert_eq!(cfg.spoonacular_url, "https://api.spoonacular.com");
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = Config::from_lookup(lookup(&[("TELOXIDE_TOKEN", "tok")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SPOONACULAR_API_KEY"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            ("TELOXIDE_TOKEN", "  "),
            ("SPOONACULAR_API_KEY", "key"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELOXIDE_TOKEN"));
    }

    #[test]
    fn zero_results_per_query_is_invalid() {
        let err = Config::from_lookup(lookup(&[
            ("TELOXIDE_TOKEN", "tok"),
            ("SPOONACULAR_API_KEY", "key"),
            ("RESULTS_PER_QUERY", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RESULTS_PER_QUERY", .. }));
    }
}
