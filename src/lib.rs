//! Schema Release
//!
//! Release-time generation of TypeScript, Go, Rust and Python artifacts from
//! a JSON Schema, stamped with the upcoming release version.
//!
//! The crate implements the two lifecycle steps a release host calls:
//! `verify_conditions` (are the configured schemas there?) and `prepare`
//! (load, dereference, render and write every selected language).
//!
//! # Example
//!
//! ```no_run
//! use schema_release::{Language, Languages, Plugin, PluginConfig, ReleaseContext};
//!
//! let config = PluginConfig::new("./schema.json")
//!     .outpath("generated")
//!     .languages(Languages::only(&[Language::Go, Language::Rust]));
//! let context = ReleaseContext::new().with_version("1.4.0");
//!
//! let mut plugin = Plugin::new();
//! plugin.verify_conditions(&config, &context)?;
//! plugin.prepare(&config, &context)?;
//! # Ok::<(), schema_release::ReleaseError>(())
//! ```
//!
//! # Artifacts
//!
//! | Target | Files |
//! |--------|-------|
//! | TypeScript | `<outputName>.ts`, `<outputName>.d.ts` (or `src/index.ts`, `src/schema.json`, `build/` when compiling) |
//! | Go | `<snake_title>.go` |
//! | Rust | `Cargo.toml`, `src/lib.rs` |
//! | Python | `index.py` |
//!
//! # Configuration
//!
//! ```json
//! {
//!   "schemaLocation": "./schema.json",
//!   "outpath": "generated",
//!   "languages": { "ts": true, "go": true }
//! }
//! ```

mod emit;
mod error;
mod loader;
mod names;
mod plugin;
mod transpiler;
mod tsc;
mod types;

pub use emit::merge_manifest;
pub use error::{ReleaseError, SemanticReleaseError, TranspileError};
pub use loader::{
    check_schema, dereference, exists, is_url, load_schema, load_schemas, navigate_fragment,
    LoadedSchema,
};
pub use names::{to_camel_case, to_pascal_case, to_snake_case};
pub use plugin::{Plugin, Prepared, Verification};
pub use transpiler::{BuiltinTranspiler, Transpiler};
pub use tsc::{CompilerOptions, Tsc, TsCompiler};
pub use types::{
    Language, Languages, NextRelease, PluginConfig, ReleaseContext, SchemaLocation,
    DEFAULT_OUTPUT_NAME, DEFAULT_TSC,
};

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
