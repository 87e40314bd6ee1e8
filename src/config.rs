/*
  Copyright 2017 Takashi Ogura

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
//! Named lookups into the module configuration
//!
//! The configuration is a JSON-like tree. Groups (e.g. `LEFT_FINGERS_RETARGETING`)
//! are objects, and a group can be merged with the shared `GENERAL` group using
//! [`ConfigGroup`].
use crate::errors::*;
use nalgebra::DVector;
use serde_json::{Map, Value};

/// Source of named configuration entries
pub trait ConfigSource {
    fn find(&self, key: &str) -> Option<&Value>;
}

impl ConfigSource for Map<String, Value> {
    fn find(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl ConfigSource for Value {
    fn find(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

/// A group whose missing entries are looked up in a fallback group
///
/// # Examples
///
/// ```
/// use glove_retargeting::config::*;
///
/// let config = serde_json::json!({
///     "GENERAL": { "samplingTime": 0.01, "robot": "icubSim" },
///     "LEFT_FINGERS_RETARGETING": { "samplingTime": 0.02 },
/// });
/// let group = ConfigGroup::merged(&config, "LEFT_FINGERS_RETARGETING", "GENERAL").unwrap();
/// assert_eq!(get_f64(&group, "samplingTime").unwrap(), 0.02);
/// assert_eq!(get_string(&group, "robot").unwrap(), "icubSim");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigGroup<'a> {
    primary: &'a Map<String, Value>,
    fallback: Option<&'a Map<String, Value>>,
}

impl<'a> ConfigGroup<'a> {
    pub fn new(primary: &'a Map<String, Value>, fallback: Option<&'a Map<String, Value>>) -> Self {
        ConfigGroup { primary, fallback }
    }
    /// Find `group` in `config` and merge it with `fallback` group (if it exists)
    pub fn merged(config: &'a dyn ConfigSource, group: &str, fallback: &str) -> Result<Self> {
        let primary = get_group(config, group)?;
        let fallback = config.find(fallback).and_then(Value::as_object);
        Ok(ConfigGroup::new(primary, fallback))
    }
}

impl ConfigSource for ConfigGroup<'_> {
    fn find(&self, key: &str) -> Option<&Value> {
        self.primary
            .get(key)
            .or_else(|| self.fallback.and_then(|map| map.get(key)))
    }
}

fn require<'a>(config: &'a dyn ConfigSource, key: &str) -> Result<&'a Value> {
    config
        .find(key)
        .ok_or_else(|| Error::config(key, "not found"))
}

pub fn get_group<'a>(config: &'a dyn ConfigSource, key: &str) -> Result<&'a Map<String, Value>> {
    require(config, key)?
        .as_object()
        .ok_or_else(|| Error::config(key, "is not a group"))
}

pub fn get_f64(config: &dyn ConfigSource, key: &str) -> Result<f64> {
    require(config, key)?
        .as_f64()
        .ok_or_else(|| Error::config(key, "is not a number"))
}

pub fn get_f64_or(config: &dyn ConfigSource, key: &str, default: f64) -> Result<f64> {
    match config.find(key) {
        Some(_) => get_f64(config, key),
        None => Ok(default),
    }
}

/// Boolean entry, `0`/`1` are also accepted
pub fn get_bool_or(config: &dyn ConfigSource, key: &str, default: bool) -> Result<bool> {
    match config.find(key) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(Error::config(key, format!("{} is not a boolean", n))),
        },
        Some(other) => Err(Error::config(key, format!("{} is not a boolean", other))),
    }
}

pub fn get_usize_or(config: &dyn ConfigSource, key: &str, default: usize) -> Result<usize> {
    match config.find(key) {
        None => Ok(default),
        Some(value) => value
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| Error::config(key, "is not a non-negative integer")),
    }
}

pub fn get_u64(config: &dyn ConfigSource, key: &str) -> Result<Option<u64>> {
    match config.find(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| Error::config(key, "is not a non-negative integer")),
    }
}

pub fn get_string(config: &dyn ConfigSource, key: &str) -> Result<String> {
    require(config, key)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::config(key, "is not a string"))
}

pub fn get_string_or(config: &dyn ConfigSource, key: &str, default: &str) -> Result<String> {
    match config.find(key) {
        Some(_) => get_string(config, key),
        None => Ok(default.to_owned()),
    }
}

/// List of numbers with the expected length
///
/// # Examples
///
/// ```
/// use glove_retargeting::config::get_vector;
///
/// let config = serde_json::json!({ "fingersScaling": [1.0, 2.0, 1.5] });
/// assert_eq!(get_vector(&config, "fingersScaling", 3).unwrap()[1], 2.0);
/// assert!(get_vector(&config, "fingersScaling", 5).is_err());
/// assert!(get_vector(&config, "missing", 3).is_err());
/// ```
pub fn get_vector(config: &dyn ConfigSource, key: &str, expected_len: usize) -> Result<DVector<f64>> {
    let list = require(config, key)?
        .as_array()
        .ok_or_else(|| Error::config(key, "is not a list"))?;
    if list.len() != expected_len {
        return Err(Error::config(
            key,
            format!("has {} elements, {} expected", list.len(), expected_len),
        ));
    }
    let values = list
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| Error::config(key, format!("{} is not a number", v)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DVector::from_vec(values))
}
