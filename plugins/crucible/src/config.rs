//! Runner configuration.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const ENV_ITERATIONS: &str = "CRUCIBLE_ITERATIONS";
pub const ENV_SEED: &str = "CRUCIBLE_SEED";
pub const ENV_NAME_BINDING: &str = "CRUCIBLE_NAME_BINDING";
pub const ENV_FAIL_FAST: &str = "CRUCIBLE_FAIL_FAST";

pub const DEFAULT_ITERATIONS: usize = 256;

/// How repeated requests for the same name behave within one path.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameBinding {
    /// Every request draws a new value.
    #[default]
    Fresh,
    /// The first value drawn under a name is returned for every later
    /// request with that name, truncated to the requested width.
    Shared,
}

impl FromStr for NameBinding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fresh" => Ok(NameBinding::Fresh),
            "shared" => Ok(NameBinding::Shared),
            _ => Err("expected `fresh` or `shared`".to_string()),
        }
    }
}

impl fmt::Display for NameBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameBinding::Fresh => write!(f, "fresh"),
            NameBinding::Shared => write!(f, "shared"),
        }
    }
}

/// Settings for a [`crate::Runner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum number of paths to execute.
    pub iterations: usize,
    /// Seed for the value strategy. `None` draws one from OS entropy; the
    /// seed actually used is recorded in the report.
    pub seed: Option<u64>,
    pub name_binding: NameBinding,
    /// Stop at the first path that produces a finding.
    pub fail_fast: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            name_binding: NameBinding::Fresh,
            fail_fast: true,
        }
    }
}

impl RunConfig {
    /// Build a configuration from the defaults overridden by environment
    /// variables.
    ///
    /// # Environment Variables
    ///
    /// - `CRUCIBLE_ITERATIONS` - number of paths per harness (at least 1)
    /// - `CRUCIBLE_SEED` - fixed seed for the value strategy
    /// - `CRUCIBLE_NAME_BINDING` - `fresh` (default) or `shared`
    /// - `CRUCIBLE_FAIL_FAST` - `true`/`false` (also `1`/`0`, `yes`/`no`)
    ///
    /// Empty variables are treated as unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`RunConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_ITERATIONS) {
            let iterations = value
                .trim()
                .parse::<usize>()
                .map_err(|err| invalid(ENV_ITERATIONS, &value, err.to_string()))?;
            if iterations == 0 {
                return Err(invalid(ENV_ITERATIONS, &value, "must be at least 1".to_string()));
            }
            config.iterations = iterations;
        }

        if let Some(value) = get(ENV_SEED) {
            let seed = value
                .trim()
                .parse::<u64>()
                .map_err(|err| invalid(ENV_SEED, &value, err.to_string()))?;
            config.seed = Some(seed);
        }

        if let Some(value) = get(ENV_NAME_BINDING) {
            config.name_binding = value
                .parse()
                .map_err(|reason| invalid(ENV_NAME_BINDING, &value, reason))?;
        }

        if let Some(value) = get(ENV_FAIL_FAST) {
            config.fail_fast = parse_flag(&value)
                .ok_or_else(|| invalid(ENV_FAIL_FAST, &value, "expected a boolean".to_string()))?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") || value == "1" || value.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" || value.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

fn invalid(var: &'static str, value: &str, reason: String) -> Error {
    Error::InvalidConfig {
        var,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = RunConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert!(config.fail_fast);
    }

    #[test]
    fn overrides_are_applied() {
        let config = RunConfig::from_lookup(lookup(&[
            (ENV_ITERATIONS, "12"),
            (ENV_SEED, " 99 "),
            (ENV_NAME_BINDING, "Shared"),
            (ENV_FAIL_FAST, "no"),
        ]))
        .unwrap();
        assert_eq!(config.iterations, 12);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.name_binding, NameBinding::Shared);
        assert!(!config.fail_fast);
    }

    #[test]
    fn empty_values_are_ignored() {
        let config = RunConfig::from_lookup(lookup(&[(ENV_SEED, "  ")])).unwrap();
        assert_eq!(config.seed, None);
    }

    #[test]
    fn rejects_bad_values() {
        let err = RunConfig::from_lookup(lookup(&[(ENV_ITERATIONS, "lots")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { var: ENV_ITERATIONS, .. }));

        let err = RunConfig::from_lookup(lookup(&[(ENV_ITERATIONS, "0")])).unwrap_err();
        assert!(err.to_string().contains("at least 1"));

        let err = RunConfig::from_lookup(lookup(&[(ENV_NAME_BINDING, "sticky")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { var: ENV_NAME_BINDING, .. }));

        let err = RunConfig::from_lookup(lookup(&[(ENV_FAIL_FAST, "maybe")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { var: ENV_FAIL_FAST, .. }));
    }
}
