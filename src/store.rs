//! Long-lived configuration store
//!
//! The store is the authoritative merged mapping after all parses and plugin
//! runs. It is explicitly constructed and exclusively owned by the loader;
//! external code reads through accessors and never mutates it directly.

use serde::Serialize;

use crate::parser::{EnvMap, EnvValue, ParsePayload};

/// Merged configuration state surviving across parse passes
///
/// Merge semantics, not union: later parses overwrite earlier values for the
/// same key, keeping the key's original position.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvStore {
    entries: EnvMap,
    types: EnvMap,
    objects: EnvMap,
}

impl EnvStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one parse payload into the store
    pub fn merge(&mut self, payload: ParsePayload) {
        self.entries.extend(payload.vars);
        self.types.extend(payload.types);
        self.objects.extend(payload.objects);
    }

    /// Looks up a key in the flat mapping
    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.entries.get(key)
    }

    /// Looks up an object path given as segments
    pub fn get_path(&self, segments: &[&str]) -> Option<&EnvValue> {
        self.objects.get(&segments.join("->"))
    }

    /// The flat mapping
    pub fn entries(&self) -> &EnvMap {
        &self.entries
    }

    /// The type-suffixed side-mapping
    pub fn types(&self) -> &EnvMap {
        &self.types
    }

    /// The object-path side-mapping
    pub fn objects(&self) -> &EnvMap {
        &self.objects
    }

    /// Number of flat entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the flat mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
