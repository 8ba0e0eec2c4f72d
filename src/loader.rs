//! Load boundary: options, encodings, loader, and builder
//!
//! The loader owns the long-lived store and plugin registry, reads the
//! environment file, and merges successful parses. File-system access and
//! process-environment reads are confined to this module; a failed load
//! leaves the store untouched and is returned as a value, never a panic.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::coerce::CoercionMode;
use crate::error::EnvError;
use crate::objects::ObjectPathPlugin;
use crate::parser::{EnvValue, ParseOptions, ParsePayload, parse_with};
use crate::plugin::{EnvPlugin, PluginMeta, PluginRegistry, PluginToken};
use crate::store::EnvStore;

/// Text encoding of the environment file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Strict UTF-8; invalid bytes fail the load
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced
    Utf8Lossy,
    /// ISO-8859-1, one byte per character
    Latin1,
}

impl Encoding {
    fn decode(&self, bytes: Vec<u8>, path: &Path) -> Result<String, EnvError> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|_| EnvError::Encoding {
                path: path.to_path_buf(),
                encoding: *self,
            }),
            Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Options recognized by the load operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Environment file location
    pub path: PathBuf,
    /// File encoding
    pub encoding: Encoding,
    /// Enables the types side-mapping and explicit coercion
    pub types: bool,
    /// Enables the objects side-mapping and path aggregation
    pub objects: bool,
    /// Coercion behavior for untyped values
    pub coercion: CoercionMode,
    /// Placeholder prefix character
    pub interpolate_prefix: char,
    /// Emits lifecycle events through `tracing` when set
    pub logging: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".env"),
            encoding: Encoding::Utf8,
            types: false,
            objects: false,
            coercion: CoercionMode::Explicit,
            interpolate_prefix: '$',
            logging: true,
        }
    }
}

impl From<&LoadOptions> for ParseOptions {
    fn from(options: &LoadOptions) -> Self {
        Self {
            interpolate_prefix: options.interpolate_prefix,
            types: options.types,
            objects: options.objects,
            coercion: options.coercion,
        }
    }
}

/// Status snapshot returned by [`EnvLoader::stat`]
#[derive(Debug, Clone, Serialize)]
pub struct EnvStat {
    /// Options the loader currently runs with
    pub options: LoadOptions,
    /// True once a load has succeeded
    pub initialized: bool,
    /// Crate version
    pub version: String,
    /// Metadata of registered plugins, in registration order
    pub plugins: Vec<PluginMeta>,
}

/// Environment file loader owning the store and plugin registry
pub struct EnvLoader {
    options: LoadOptions,
    store: EnvStore,
    registry: PluginRegistry,
    initialized: bool,
}

impl EnvLoader {
    /// Creates a loader with default options
    pub fn new() -> Self {
        Self::with_options(LoadOptions::default())
    }

    /// Creates a loader with the given options
    ///
    /// The object-path aggregation plugin is registered automatically when
    /// objects mode is on.
    pub fn with_options(options: LoadOptions) -> Self {
        let mut registry = PluginRegistry::new();
        if options.objects {
            registry.register(Box::new(ObjectPathPlugin::new()));
        }
        Self {
            options,
            store: EnvStore::new(),
            registry,
            initialized: false,
        }
    }

    /// Returns a builder for configuring a loader fluently
    pub fn builder() -> EnvLoaderBuilder {
        EnvLoaderBuilder::new()
    }

    /// Reads, parses, and merges the configured environment file
    ///
    /// Returns the payload of this pass; the store keeps the merged result.
    /// A missing or unreadable file, an undecodable byte sequence, or a
    /// parse-aborting condition is returned as an error with the store left
    /// unchanged.
    pub fn load(&mut self) -> Result<ParsePayload, EnvError> {
        let path = self.options.path.clone();
        if self.options.logging {
            info!(path = %path.display(), "loading environment file");
        }
        let bytes = fs::read(&path).map_err(|source| EnvError::Load {
            path: path.clone(),
            source,
        })?;
        let text = self.options.encoding.decode(bytes, &path)?;
        let payload = self.load_str(&text)?;
        if self.options.logging {
            info!(
                path = %path.display(),
                entries = payload.vars.len(),
                "environment loaded"
            );
        }
        Ok(payload)
    }

    /// Parses source text directly and merges it into the store
    ///
    /// The embedding seam: identical to [`load`](EnvLoader::load) minus the
    /// file system.
    pub fn load_str(&mut self, source: &str) -> Result<ParsePayload, EnvError> {
        let parse_options = ParseOptions::from(&self.options);
        let payload = parse_with(source, &parse_options, &mut self.registry, &self.store)?;
        self.store.merge(payload.clone());
        self.initialized = true;
        Ok(payload)
    }

    /// Looks up a key: store first, process environment as fallback
    ///
    /// The process environment is only ever read, never mutated.
    pub fn get(&self, key: &str) -> Option<EnvValue> {
        if let Some(value) = self.store.get(key) {
            return Some(value.clone());
        }
        env::var(key).ok().map(EnvValue::String)
    }

    /// Registers a plugin into the long-lived registry
    pub fn use_plugin(&mut self, plugin: Box<dyn EnvPlugin>) -> PluginToken {
        self.registry.register(plugin)
    }

    /// Removes a previously registered plugin
    pub fn remove_plugin(&mut self, token: PluginToken) -> bool {
        self.registry.unregister(token)
    }

    /// Current options, initialization flag, and plugin metadata
    pub fn stat(&self) -> EnvStat {
        EnvStat {
            options: self.options.clone(),
            initialized: self.initialized,
            version: env!("CARGO_PKG_VERSION").to_string(),
            plugins: self.registry.metas(),
        }
    }

    /// Read access to the merged store
    pub fn store(&self) -> &EnvStore {
        &self.store
    }

    /// The loader's options
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent builder for [`EnvLoader`]
#[derive(Default)]
pub struct EnvLoaderBuilder {
    options: LoadOptions,
    plugins: Vec<Box<dyn EnvPlugin>>,
}

impl EnvLoaderBuilder {
    /// Creates a builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment file path
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.path = path.into();
        self
    }

    /// Sets the file encoding
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.options.encoding = encoding;
        self
    }

    /// Enables or disables the types side-mapping
    pub fn with_types(mut self, types: bool) -> Self {
        self.options.types = types;
        self
    }

    /// Enables or disables the objects side-mapping
    pub fn with_objects(mut self, objects: bool) -> Self {
        self.options.objects = objects;
        self
    }

    /// Sets the coercion mode for untyped values
    pub fn with_coercion(mut self, mode: CoercionMode) -> Self {
        self.options.coercion = mode;
        self
    }

    /// Sets the placeholder prefix character
    pub fn with_interpolate_prefix(mut self, prefix: char) -> Self {
        self.options.interpolate_prefix = prefix;
        self
    }

    /// Enables or disables lifecycle logging
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.options.logging = logging;
        self
    }

    /// Queues a plugin for registration at build time
    pub fn with_plugin(mut self, plugin: Box<dyn EnvPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Builds the loader and registers queued plugins
    pub fn build(self) -> EnvLoader {
        let mut loader = EnvLoader::with_options(self.options);
        for plugin in self.plugins {
            loader.use_plugin(plugin);
        }
        loader
    }
}
