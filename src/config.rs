use std::env;
use std::time::Duration;

use tracing::debug;

use crate::countries::DEFAULT_ENDPOINT;
use crate::debounce::DEFAULT_QUIET_PERIOD;
use crate::error::AppError;

pub const API_URL_VAR: &str = "COUNTRY_API_URL";
pub const DEBOUNCE_VAR: &str = "COUNTRY_SUGGEST_DEBOUNCE_MS";
pub const TICK_VAR: &str = "COUNTRY_CLOCK_TICK_MS";
pub const TIMEOUT_VAR: &str = "COUNTRY_HTTP_TIMEOUT_SECS";

/// Runtime settings, defaults overridable from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the restcountries v3.1 API
    pub api_base_url: String,
    /// Quiet period before a suggestion lookup fires
    pub suggest_debounce: Duration,
    /// Period of the live clock
    pub clock_tick: Duration,
    /// Timeout for each request to the country service
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_ENDPOINT.to_string(),
            suggest_debounce: DEFAULT_QUIET_PERIOD,
            clock_tick: Duration::from_secs(1),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any variable source; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup(API_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(ms) = parse_number(&lookup, DEBOUNCE_VAR)? {
            config.suggest_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_number(&lookup, TICK_VAR)? {
            if ms == 0 {
                return Err(AppError::InvalidConfig {
                    name: TICK_VAR,
                    value: ms.to_string(),
                });
            }
            config.clock_tick = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_number(&lookup, TIMEOUT_VAR)? {
            config.http_timeout = Duration::from_secs(secs);
        }

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }
}

fn parse_number<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, AppError>
where
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::InvalidConfig { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&'static str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_overrides() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "https://restcountries.com/v3.1");
        assert_eq!(config.suggest_debounce, Duration::from_millis(300));
        assert_eq!(config.clock_tick, Duration::from_secs(1));
    }

    #[test]
    fn applies_overrides() {
        let config = config_from(&[
            (API_URL_VAR, "http://localhost:8080/v3.1"),
            (DEBOUNCE_VAR, "150"),
            (TICK_VAR, " 500 "),
            (TIMEOUT_VAR, "3"),
        ])
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080/v3.1");
        assert_eq!(config.suggest_debounce, Duration::from_millis(150));
        assert_eq!(config.clock_tick, Duration::from_millis(500));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = config_from(&[(DEBOUNCE_VAR, "soon")]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { name: DEBOUNCE_VAR, .. }));

        let err = config_from(&[(TICK_VAR, "0")]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig { name: TICK_VAR, .. }));
    }
}
