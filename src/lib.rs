//! # envpipe
//!
//! A pipeline-based `.env` loader: quoted values, line-based variable
//! interpolation, optional type tagging and nested object-path keys, and a
//! plugin system that lets external code hook into the parse pipeline and
//! contribute derived values.
//!
//! ## Overview
//!
//! Source text flows through a fixed sequence of passes. A tokenizer splits
//! the text into classified logical lines; every line is offered to each
//! registered plugin hook while the core decoder assembles a parse-scoped
//! payload; post-parse hooks run once over the assembled payload; the
//! interpolation resolver substitutes placeholders (with cycle detection);
//! and an optional coercion pass converts resolved scalars. The loader then
//! merges the payload into a long-lived store.
//!
//! ## Quick Start
//!
//! ```rust
//! use envpipe::{ParseOptions, parse_str};
//!
//! let source = "HOST=localhost\nPORT=8080\nURL=http://$HOST:$PORT\n";
//! let payload = parse_str(source, &ParseOptions::default())?;
//!
//! assert_eq!(
//!     payload.get("URL").unwrap().as_str(),
//!     Some("http://localhost:8080")
//! );
//! # Ok::<(), envpipe::ParseError>(())
//! ```
//!
//! ## Loading a File
//!
//! ```rust,no_run
//! use envpipe::EnvLoader;
//!
//! let mut loader = EnvLoader::builder().with_path(".env").build();
//! match loader.load() {
//!     Ok(payload) => println!("loaded {} entries", payload.vars.len()),
//!     Err(err) => eprintln!("load failed: {err}"),
//! }
//! ```
//!
//! A failed load is returned as a value and leaves the store untouched; the
//! loader never panics past its boundary.
//!
//! ## Typed Keys and Auto Coercion
//!
//! ```rust
//! use envpipe::{CoercionMode, EnvLoader};
//!
//! let mut loader = EnvLoader::builder()
//!     .with_types(true)
//!     .with_coercion(CoercionMode::Auto)
//!     .with_logging(false)
//!     .build();
//! loader.load_str("DEBUG=true\nPORT:number=8080\n")?;
//!
//! assert_eq!(loader.get("DEBUG").unwrap().as_bool(), Some(true));
//! assert_eq!(loader.get("PORT").unwrap().as_number(), Some(8080.0));
//! # Ok::<(), envpipe::EnvError>(())
//! ```
//!
//! ## Interpolation
//!
//! Placeholders reference other keys with a configurable prefix (default
//! `$`), optionally braced. References resolve transitively; a backslash
//! escapes the prefix; unresolvable identifiers drop out silently; cyclic
//! references fail fast with [`ParseError::CyclicInterpolation`] instead of
//! recursing unboundedly.
//!
//! ```rust
//! use envpipe::{ParseOptions, parse_str};
//!
//! let payload = parse_str("A=1\nB=\\$A\n", &ParseOptions::default())?;
//! assert_eq!(payload.get("B").unwrap().as_str(), Some("$A"));
//! # Ok::<(), envpipe::ParseError>(())
//! ```
//!
//! ## Plugins
//!
//! A plugin declares which pipeline stages it hooks; the registry dispatches
//! by declared capability, preserves registration order, and isolates hook
//! failures so one misbehaving plugin never aborts a pass.
//!
//! ```rust
//! use envpipe::{EnvLoader, EnvPlugin, HookContext, PluginError, PluginMeta, Stage};
//!
//! struct Stamp;
//!
//! impl EnvPlugin for Stamp {
//!     fn meta(&self) -> PluginMeta {
//!         PluginMeta::new("stamp", "1.0.0")
//!     }
//!
//!     fn stages(&self) -> &'static [Stage] {
//!         &[Stage::PostParse]
//!     }
//!
//!     fn on_post_parse(&mut self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
//!         ctx.register("LOADED_BY", "stamp");
//!         Ok(())
//!     }
//! }
//!
//! let mut loader = EnvLoader::builder()
//!     .with_logging(false)
//!     .with_plugin(Box::new(Stamp))
//!     .build();
//! loader.load_str("A=1\n")?;
//! assert_eq!(loader.get("LOADED_BY").unwrap().as_str(), Some("stamp"));
//! # Ok::<(), envpipe::EnvError>(())
//! ```
//!
//! ## Concurrency
//!
//! The pipeline is single-threaded, synchronous, and cooperative: a parse
//! call runs to completion before returning, and the store is plainly owned
//! by the loader. An embedding that reloads configuration while serving
//! reads must wrap the loader in its own synchronization.

pub mod coerce;
pub mod decoder;
pub mod error;
pub mod interpolate;
pub mod loader;
pub mod objects;
pub mod parser;
pub mod plugin;
pub mod store;
pub mod tokenizer;

// Re-export main types and functions
pub use coerce::{
    CoercionMode, UnknownValueKind, ValueKind, coerce, coerce_auto, coerce_typed, to_boolean,
    to_number,
};
pub use decoder::decode;
pub use error::{EnvError, ParseError, PluginError};
pub use interpolate::Interpolator;
pub use loader::{Encoding, EnvLoader, EnvLoaderBuilder, EnvStat, LoadOptions};
pub use objects::{ObjectPathPlugin, path_segments};
pub use parser::{EnvMap, EnvValue, ParseOptions, ParsePayload, parse_str, parse_with};
pub use plugin::{EnvPlugin, HookContext, PluginMeta, PluginRegistry, PluginToken, Stage};
pub use store::EnvStore;
pub use tokenizer::{LineClass, LineTokenizer, LogicalLines, SourceLine, classify};
