use std::str::FromStr;
use std::time::Duration;

use crate::{
    error::{PlannerError, Result},
    services::DEFAULT_BASE_URL,
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider credential and sampling settings, resolved once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl PlannerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `GEMINI_*` / `PLANNER_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("GOOGLE_API_KEY"))
            .ok_or_else(|| {
                PlannerError::Config(
                    "GEMINI_API_KEY environment variable must be set before creating a planner"
                        .to_string(),
                )
            })?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(raw) = lookup("PLANNER_TEMPERATURE") {
            config.temperature = parse_setting("PLANNER_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = lookup("PLANNER_MAX_OUTPUT_TOKENS") {
            config.max_output_tokens = parse_setting("PLANNER_MAX_OUTPUT_TOKENS", &raw)?;
        }
        if let Some(raw) = lookup("PLANNER_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_setting("PLANNER_TIMEOUT_SECS", &raw)?);
        }

        Ok(config)
    }
}

fn parse_setting<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err| PlannerError::Config(format!("invalid value `{raw}` for {key}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();

        assert_eq!(config.api_key, "k");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_output_tokens, 2048);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides_and_fallback_key() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "g"),
            ("GEMINI_BASE_URL", "http://localhost:1234"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("PLANNER_TEMPERATURE", "0.2"),
            ("PLANNER_MAX_OUTPUT_TOKENS", "4096"),
            ("PLANNER_TIMEOUT_SECS", " 15 "),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "g");
        assert_eq!(config.base_url, "http://localhost:1234");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_output_tokens, 4096);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err = PlannerConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = PlannerConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("PLANNER_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("PLANNER_TIMEOUT_SECS"));
    }
}
