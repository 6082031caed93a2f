// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Read-only access to configuration values.
//!
//! Client configuration is resolved through the [`Environment`] trait rather than
//! `std::env` directly, so tests (and embedders) can supply values from a map.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Like `get`, but treats blank values as unset.
    fn get_non_blank(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn get_required(&self, key: &'static str) -> Result<String, EnvError> {
        self.get_non_blank(key).ok_or(EnvError::Missing { key })
    }

    /// Comma separated list. Empty entries are dropped.
    fn get_list(&self, key: &str, default_value: Vec<String>) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or(default_value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("Environment variable {key} is not set")]
    Missing { key: &'static str },

    #[error("Invalid value {value} for {key}: {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
}

/// Parses an optional value, failing if it is set but not parseable.
pub fn get_parsed<T>(env: &dyn Environment, key: &'static str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env.get_non_blank(key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| EnvError::Invalid {
                key,
                value,
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Default)]
pub struct MapEnvironment {
    values: HashMap<String, String>,
    fallback: Option<Arc<dyn Environment>>,
}

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| self.fallback.as_ref().and_then(|fb| fb.get(key)))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnvironment {
    fn from(values: [(&str, &str); N]) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fallback: None,
        }
    }
}

impl MapEnvironment {
    pub fn new_with_fallback(fallback: Arc<dyn Environment>) -> Self {
        Self {
            values: HashMap::new(),
            fallback: Some(fallback),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_unset() {
        let env = MapEnvironment::from([("A", "  "), ("B", " x ")]);
        assert_eq!(env.get_non_blank("A"), None);
        assert_eq!(env.get_non_blank("B"), Some("x".to_string()));
        assert!(matches!(
            env.get_required("A"),
            Err(EnvError::Missing { key: "A" })
        ));
    }

    #[test]
    fn lists_skip_empty_entries() {
        let env = MapEnvironment::from([("LIST", "login, register,,")]);
        assert_eq!(
            env.get_list("LIST", vec![]),
            vec!["login".to_string(), "register".to_string()]
        );
        assert_eq!(env.get_list("MISSING", vec!["d".to_string()]), vec!["d"]);
    }

    #[test]
    fn parsed_values() {
        let env = MapEnvironment::from([("N", "30"), ("BAD", "thirty")]);
        assert_eq!(get_parsed::<u64>(&env, "N").unwrap(), Some(30));
        assert_eq!(get_parsed::<u64>(&env, "UNSET").unwrap(), None);
        assert!(get_parsed::<u64>(&env, "BAD").is_err());
    }

    #[test]
    fn map_falls_back() {
        let base = Arc::new(MapEnvironment::from([("A", "base"), ("B", "base")]));
        let mut env = MapEnvironment::new_with_fallback(base);
        env.set("A", "override");
        assert_eq!(env.get("A"), Some("override".to_string()));
        assert_eq!(env.get("B"), Some("base".to_string()));
    }
}
