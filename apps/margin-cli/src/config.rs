//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.
//!
//! ```text
//! MARGIN_LOG                       tracing filter        (default: info)
//! MARGIN_DEFAULT_TIER              cm0 | cm1 | cm2       (default: cm2)
//! MARGIN_DEFAULT_TARGET            target margin %       (default: unset)
//! MARGIN_MAX_ITERATIONS            solver bisection cap  (default: 200)
//! MARGIN_MAX_BRACKET_EXPANSIONS    solver bracket cap    (default: 64)
//! MARGIN_PRECISION                 margin decimal places (default: 2)
//! MARGIN_PRETTY                    pretty-print JSON     (default: true)
//! ```

use margin_core::{SolverConfig, Tier};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// `tracing-subscriber` env filter directive
    pub log_filter: String,

    /// Tier used when a batch item names none
    pub default_tier: Tier,

    /// Target margin used when a batch item names none.
    /// No target means no price search for that item.
    pub default_target: Option<f64>,

    /// Price solver limits
    pub solver: SolverConfig,

    /// Pretty-print the JSON report
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            default_tier: Tier::Cm2,
            default_target: None,
            solver: SolverConfig::DEFAULT,
            pretty: true,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (environment, test fixtures).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CliConfig::default();

        let config = CliConfig {
            log_filter: lookup("MARGIN_LOG").unwrap_or(defaults.log_filter),

            default_tier: parse_or(&lookup, "MARGIN_DEFAULT_TIER", defaults.default_tier)?,

            default_target: match lookup("MARGIN_DEFAULT_TARGET") {
                Some(raw) => Some(parse(&raw, "MARGIN_DEFAULT_TARGET")?),
                None => None,
            },

            solver: defaults
                .solver
                .max_iterations(parse_or(
                    &lookup,
                    "MARGIN_MAX_ITERATIONS",
                    defaults.solver.max_iterations,
                )?)
                .max_bracket_expansions(parse_or(
                    &lookup,
                    "MARGIN_MAX_BRACKET_EXPANSIONS",
                    defaults.solver.max_bracket_expansions,
                )?)
                .precision(parse_or(&lookup, "MARGIN_PRECISION", defaults.solver.precision)?),

            pretty: parse_or(&lookup, "MARGIN_PRETTY", defaults.pretty)?,
        };

        if let Some(target) = config.default_target {
            if !target.is_finite() {
                return Err(ConfigError::InvalidValue("MARGIN_DEFAULT_TARGET".to_string()));
            }
        }

        // Beyond 15 places rounding no longer changes an f64 margin.
        if config.solver.precision > 15 {
            return Err(ConfigError::InvalidValue("MARGIN_PRECISION".to_string()));
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(raw: &str, key: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse(&raw, key),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.default_tier, Tier::Cm2);
        assert_eq!(config.default_target, None);
        assert_eq!(config.solver, SolverConfig::DEFAULT);
        assert!(config.pretty);
    }

    #[test]
    fn test_overrides() {
        let config = CliConfig::from_lookup(lookup_from(&[
            ("MARGIN_LOG", "margin_core=trace"),
            ("MARGIN_DEFAULT_TIER", "CM1"),
            ("MARGIN_DEFAULT_TARGET", "12.5"),
            ("MARGIN_MAX_ITERATIONS", "50"),
            ("MARGIN_MAX_BRACKET_EXPANSIONS", "10"),
            ("MARGIN_PRECISION", "3"),
            ("MARGIN_PRETTY", "false"),
        ]))
        .unwrap();

        assert_eq!(config.log_filter, "margin_core=trace");
        assert_eq!(config.default_tier, Tier::Cm1);
        assert_eq!(config.default_target, Some(12.5));
        assert_eq!(config.solver.max_iterations, 50);
        assert_eq!(config.solver.max_bracket_expansions, 10);
        assert_eq!(config.solver.precision, 3);
        assert!(!config.pretty);
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("MARGIN_DEFAULT_TIER", "cm7"),
            ("MARGIN_DEFAULT_TARGET", "twelve"),
            ("MARGIN_DEFAULT_TARGET", "NaN"),
            ("MARGIN_MAX_ITERATIONS", "-1"),
            ("MARGIN_PRECISION", "40"),
            ("MARGIN_PRETTY", "yes"),
        ];

        for (key, value) in cases {
            let err = CliConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid value for {key}"));
        }
    }
}
