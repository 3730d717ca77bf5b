//! Persistence for registries.
//!
//! The only durable shape is a pattern → value map. A registry serializes as
//! that map in registration order; deserializing imports the map into a fresh
//! registry with default [`Options`], so ids are assigned again from 1.
//! A pattern registered more than once is written once, with the value that
//! lookups return.
//!
//! No schema version is written. Callers that need one can wrap the map.

use super::registry::PatternRegistry;
use crate::api::Options;
use crate::error::Result;
use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

impl<T: Serialize> Serialize for PatternRegistry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.distinct())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PatternRegistry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = IndexMap::<String, T>::deserialize(deserializer)?;
        let mut registry = PatternRegistry::new();
        registry.import(data).map_err(<D::Error as de::Error>::custom)?;
        Ok(registry)
    }
}

/// Serialize `registry` as a JSON object.
pub fn export_json<T: Serialize>(registry: &PatternRegistry<T>) -> Result<String> {
    Ok(serde_json::to_string(registry)?)
}

/// Load a registry from a JSON object produced by [`export_json`].
pub fn import_json<T: DeserializeOwned>(json: &str, options: Options) -> Result<PatternRegistry<T>> {
    let data: IndexMap<String, T> = serde_json::from_str(json)?;
    let mut registry = PatternRegistry::with_options(options);
    registry.import(data)?;
    Ok(registry)
}
