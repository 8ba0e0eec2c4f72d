//! Parse pass orchestration
//!
//! This module drives the passes over one source text: the classified line
//! pass (offering every line to registered plugin hooks), the post-parse hook
//! pass, the interpolation pass, and the coercion pass. The product is a
//! [`ParsePayload`] that the loader merges into the long-lived store.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::trace;

use crate::coerce::{CoercionMode, ValueKind, coerce_auto, coerce_typed};
use crate::decoder::decode;
use crate::error::ParseError;
use crate::interpolate::Interpolator;
use crate::objects::ObjectPathPlugin;
use crate::plugin::{HookContext, PluginRegistry};
use crate::store::EnvStore;
use crate::tokenizer::{LineClass, LineTokenizer};

/// A parsed configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvValue {
    String(String),
    Boolean(bool),
    Number(f64),
}

impl EnvValue {
    /// Returns true if the value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, EnvValue::String(_))
    }

    /// Returns the string content, if the value is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EnvValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean content, if the value is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EnvValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric content, if the value is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EnvValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::String(s) => f.write_str(s),
            EnvValue::Boolean(b) => write!(f, "{b}"),
            EnvValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        EnvValue::String(value.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        EnvValue::String(value)
    }
}

impl From<bool> for EnvValue {
    fn from(value: bool) -> Self {
        EnvValue::Boolean(value)
    }
}

impl From<f64> for EnvValue {
    fn from(value: f64) -> Self {
        EnvValue::Number(value)
    }
}

/// Insertion-ordered mapping from keys to values
pub type EnvMap = IndexMap<String, EnvValue>;

/// Transient product of one parse pass
///
/// Created empty at the start of a parse call, populated line by line and by
/// plugin hooks, then discarded after its content is merged into the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsePayload {
    /// Primary flat mapping
    pub vars: EnvMap,
    /// Type-suffixed side-mapping (`name:type` keys), populated in types mode
    pub types: EnvMap,
    /// Object-path side-mapping (`->`-joined keys), populated in objects mode
    pub objects: EnvMap,
}

impl ParsePayload {
    /// Creates an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a key in the flat mapping
    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.vars.get(key)
    }

    /// Returns true if no mapping holds any entry
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.types.is_empty() && self.objects.is_empty()
    }
}

/// Options governing one parse pass
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Placeholder prefix character
    pub interpolate_prefix: char,
    /// Enables the `types` side-mapping and explicit coercion
    pub types: bool,
    /// Enables the `objects` side-mapping and path aggregation
    pub objects: bool,
    /// Coercion behavior for untyped values
    pub coercion: CoercionMode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            interpolate_prefix: '$',
            types: false,
            objects: false,
            coercion: CoercionMode::Explicit,
        }
    }
}

/// Parses source text with a scratch registry and no committed store
///
/// The objects-mode aggregation plugin is wired in automatically when
/// `options.objects` is set. Embedders that keep long-lived plugins or a
/// store use [`parse_with`] instead.
pub fn parse_str(source: &str, options: &ParseOptions) -> Result<ParsePayload, ParseError> {
    let mut registry = PluginRegistry::new();
    if options.objects {
        registry.register(Box::new(ObjectPathPlugin::new()));
    }
    let store = EnvStore::new();
    parse_with(source, options, &mut registry, &store)
}

/// Parses source text against an existing registry and committed store
///
/// Pass order: classified line pass (core decoding plus parse-line hooks),
/// post-parse hooks, interpolation, coercion. Committed store values act as
/// an interpolation fallback; the store itself is not mutated here.
pub fn parse_with(
    source: &str,
    options: &ParseOptions,
    registry: &mut PluginRegistry,
    store: &EnvStore,
) -> Result<ParsePayload, ParseError> {
    let mut payload = ParsePayload::new();
    let mut typed_kinds: IndexMap<String, ValueKind> = IndexMap::new();

    // Line pass. The core decoder runs first on each line, then every
    // registered parse-line hook sees the line in registration order.
    let tokenizer = LineTokenizer::new(source);
    for line in tokenizer.lines() {
        match &line.class {
            LineClass::Pair { key, value } => {
                payload
                    .vars
                    .insert((*key).to_string(), EnvValue::String(decode(value)));
                // A plain redefinition discards any earlier type annotation.
                typed_kinds.shift_remove(*key);
            }
            LineClass::Typed { key, kind, value } => {
                payload
                    .vars
                    .insert((*key).to_string(), EnvValue::String(decode(value)));
                typed_kinds.insert((*key).to_string(), *kind);
            }
            LineClass::Path { key, value } => {
                if options.objects {
                    payload
                        .objects
                        .insert((*key).to_string(), EnvValue::String(decode(value)));
                }
            }
            LineClass::Malformed => {
                trace!(line = line.index, "skipping unrecognized line");
            }
            LineClass::Blank | LineClass::Comment => {}
        }

        let mut ctx = HookContext::new(&mut payload, options);
        registry.run_parse_line(&line, &mut ctx);
    }

    // Post-parse hooks see the fully assembled payload once. Two-pass
    // reconstructions (path aggregation) happen here, before interpolation,
    // so derived keys are visible to object-path lookups.
    let mut ctx = HookContext::new(&mut payload, options);
    registry.run_post_parse(&mut ctx);

    // Interpolation pass against the assembled payload and committed store.
    let snapshot = payload.clone();
    let resolver = Interpolator::new(
        options.interpolate_prefix,
        options.objects,
        &snapshot,
        Some(store),
    );
    for (key, value) in payload.vars.iter_mut() {
        if let EnvValue::String(text) = value {
            *text = resolver.resolve_entry(key, text)?;
        }
    }
    for (key, value) in payload.objects.iter_mut() {
        if let EnvValue::String(text) = value {
            *text = resolver.resolve_entry(key, text)?;
        }
    }

    // Coercion pass over resolved values.
    if options.types || options.coercion == CoercionMode::Auto {
        for (key, value) in payload.vars.iter_mut() {
            let Some(text) = value.as_str().map(str::to_string) else {
                continue;
            };
            if let Some(kind) = typed_kinds.get(key) {
                let coerced = coerce_typed(*kind, &text);
                if options.types {
                    payload.types.insert(format!("{key}:{kind}"), coerced.clone());
                }
                *value = coerced;
            } else if options.coercion == CoercionMode::Auto {
                *value = coerce_auto(&text);
            }
        }
    }

    Ok(payload)
}
