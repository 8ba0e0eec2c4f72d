//! Plugin pipeline: capability declarations, registration, dispatch
//!
//! A plugin declares which pipeline stages it hooks through a typed
//! descriptor; the registry dispatches by declared capability and keeps
//! insertion-ordered hook tables, because later hooks may rely on earlier
//! hooks' contributions within the same pass. Hook failures are isolated:
//! they are logged and never abort the remaining pipeline.

use indexmap::IndexMap;
use serde::Serialize;
use std::hash::{DefaultHasher, Hash, Hasher};
use tracing::{debug, warn};

use crate::error::PluginError;
use crate::parser::{EnvValue, ParseOptions, ParsePayload};
use crate::tokenizer::SourceLine;

/// Pipeline stages a plugin can hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Invoked once per classified source line
    ParseLine,
    /// Invoked once after all lines of a pass are consumed
    PostParse,
}

/// Stable identity derived from a plugin's declared metadata
pub type PluginToken = u64;

/// Declared plugin metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginMeta {
    /// Plugin name
    pub name: String,
    /// Plugin version
    pub version: String,
}

impl PluginMeta {
    /// Creates plugin metadata
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Derives the stable token for this metadata
    ///
    /// The token is a digest of name and version, so registering two plugin
    /// instances with identical metadata is idempotent.
    pub fn token(&self) -> PluginToken {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        self.version.hash(&mut hasher);
        hasher.finish()
    }
}

/// A plugin contributing hooks to the parse pipeline
///
/// Implementations declare their stages up front; the registry never probes
/// for hooks by name. Stage methods default to no-ops so a plugin only
/// overrides what it declared.
pub trait EnvPlugin {
    /// Declared metadata; identical metadata means identical identity
    fn meta(&self) -> PluginMeta;

    /// Stages this plugin hooks
    fn stages(&self) -> &'static [Stage];

    /// Called once per classified source line, in registration order
    fn on_parse_line(
        &mut self,
        _line: &SourceLine<'_>,
        _ctx: &mut HookContext<'_>,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once over the assembled payload after the line pass
    fn on_post_parse(&mut self, _ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Shared state handed to every hook invocation
///
/// Grants mutable access to the parse-scoped payload plus a convenience
/// registration callback for contributing flat entries.
pub struct HookContext<'a> {
    payload: &'a mut ParsePayload,
    options: &'a ParseOptions,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(payload: &'a mut ParsePayload, options: &'a ParseOptions) -> Self {
        Self { payload, options }
    }

    /// The payload being assembled by the current pass
    pub fn payload(&mut self) -> &mut ParsePayload {
        self.payload
    }

    /// Options of the current pass
    pub fn options(&self) -> &ParseOptions {
        self.options
    }

    /// Contributes a flat entry to the payload
    pub fn register(&mut self, key: impl Into<String>, value: impl Into<EnvValue>) {
        self.payload.vars.insert(key.into(), value.into());
    }
}

struct RegisteredPlugin {
    meta: PluginMeta,
    plugin: Box<dyn EnvPlugin>,
}

/// Insertion-ordered plugin registry
///
/// Holds one entry per token and a per-stage hook table of tokens in
/// registration order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: IndexMap<PluginToken, RegisteredPlugin>,
    parse_hooks: Vec<PluginToken>,
    post_hooks: Vec<PluginToken>,
}

impl PluginRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin, returning its stable token
    ///
    /// Re-registering identical metadata is a no-op that returns the
    /// existing token; the first instance stays in place.
    pub fn register(&mut self, plugin: Box<dyn EnvPlugin>) -> PluginToken {
        let meta = plugin.meta();
        let token = meta.token();
        if self.plugins.contains_key(&token) {
            debug!(plugin = %meta.name, "plugin already registered; keeping existing instance");
            return token;
        }
        for stage in plugin.stages() {
            match stage {
                Stage::ParseLine => self.parse_hooks.push(token),
                Stage::PostParse => self.post_hooks.push(token),
            }
        }
        debug!(plugin = %meta.name, version = %meta.version, "registered plugin");
        self.plugins.insert(token, RegisteredPlugin { meta, plugin });
        token
    }

    /// Removes a plugin and its hook table entries
    ///
    /// Returns false if the token was not registered.
    pub fn unregister(&mut self, token: PluginToken) -> bool {
        if self.plugins.shift_remove(&token).is_none() {
            return false;
        }
        self.parse_hooks.retain(|t| *t != token);
        self.post_hooks.retain(|t| *t != token);
        true
    }

    /// Returns true if a plugin with this token is registered
    pub fn contains(&self, token: PluginToken) -> bool {
        self.plugins.contains_key(&token)
    }

    /// Metadata of all registered plugins, in registration order
    pub fn metas(&self) -> Vec<PluginMeta> {
        self.plugins.values().map(|entry| entry.meta.clone()).collect()
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugin is registered
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Offers one line to every parse-line hook, isolating failures
    pub(crate) fn run_parse_line(&mut self, line: &SourceLine<'_>, ctx: &mut HookContext<'_>) {
        for token in &self.parse_hooks {
            if let Some(entry) = self.plugins.get_mut(token)
                && let Err(err) = entry.plugin.on_parse_line(line, ctx)
            {
                warn!(
                    plugin = %entry.meta.name,
                    line = line.index,
                    error = %err,
                    "parse-line hook failed; continuing with remaining lines"
                );
            }
        }
    }

    /// Runs every post-parse hook once, isolating failures
    pub(crate) fn run_post_parse(&mut self, ctx: &mut HookContext<'_>) {
        for token in &self.post_hooks {
            if let Some(entry) = self.plugins.get_mut(token)
                && let Err(err) = entry.plugin.on_post_parse(ctx)
            {
                warn!(
                    plugin = %entry.meta.name,
                    error = %err,
                    "post-parse hook failed; continuing"
                );
            }
        }
    }
}
