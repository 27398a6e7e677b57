//! The verify and prepare stages.
//!
//! [`Plugin::verify_conditions`] checks that every configured schema exists
//! and records a [`Verification`]. [`Plugin::prepare`] refuses to run without
//! one, then loads, dereferences and renders the schemas and emits each
//! selected language in the fixed order TypeScript, Go, Rust, Python.
//!
//! Verification state lives in the `Plugin` value, so one process can drive
//! any number of independent release cycles.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::emit::{self, Target};
use crate::error::ReleaseError;
use crate::loader::{dereference, exists, load_schemas};
use crate::names::words;
use crate::transpiler::{BuiltinTranspiler, Transpiler};
use crate::tsc::{Tsc, TsCompiler};
use crate::types::{PluginConfig, ReleaseContext};

/// Proof that `verify_conditions` succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    schema_paths: Vec<PathBuf>,
}

impl Verification {
    /// Absolute schema paths that were found during verification.
    pub fn schema_paths(&self) -> &[PathBuf] {
        &self.schema_paths
    }
}

/// Files written by a successful prepare.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prepared {
    pub files: Vec<PathBuf>,
}

/// Release-pipeline plugin.
pub struct Plugin<T = BuiltinTranspiler> {
    transpiler: T,
    compiler: Option<Box<dyn TsCompiler>>,
    verification: Option<Verification>,
}

impl Plugin<BuiltinTranspiler> {
    pub fn new() -> Self {
        Self::with_transpiler(BuiltinTranspiler)
    }
}

impl Default for Plugin<BuiltinTranspiler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transpiler> Plugin<T> {
    pub fn with_transpiler(transpiler: T) -> Self {
        Self {
            transpiler,
            compiler: None,
            verification: None,
        }
    }

    /// Use `compiler` for the TypeScript compile variant instead of running `tsc`.
    pub fn with_compiler(mut self, compiler: impl TsCompiler + 'static) -> Self {
        self.compiler = Some(Box::new(compiler));
        self
    }

    pub fn is_verified(&self) -> bool {
        self.verification.is_some()
    }

    pub fn verification(&self) -> Option<&Verification> {
        self.verification.as_ref()
    }

    /// Check that every configured schema location exists.
    ///
    /// All locations are checked before reporting, and every missing one is
    /// named in the error. On success the plugin is verified and `true` is
    /// returned.
    ///
    /// # Errors
    ///
    /// `ReleaseError::MissingSchemaLocation` if no location is configured,
    /// `ReleaseError::SchemaNotFound` if any location is not a readable file.
    pub fn verify_conditions(
        &mut self,
        config: &PluginConfig,
        context: &ReleaseContext,
    ) -> Result<bool, ReleaseError> {
        self.verification = None;

        let locations = config.schema_paths();
        if locations.is_empty() {
            return Err(ReleaseError::MissingSchemaLocation);
        }

        let cwd = context.working_dir();
        let schema_paths: Vec<PathBuf> = locations.iter().map(|loc| cwd.join(loc)).collect();
        let missing: Vec<PathBuf> = schema_paths
            .iter()
            .filter(|path| !exists(path))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ReleaseError::SchemaNotFound { paths: missing });
        }

        tracing::info!(schemas = schema_paths.len(), "schema locations verified");
        self.verification = Some(Verification { schema_paths });
        Ok(true)
    }

    /// Generate every selected language artifact from the verified schemas.
    ///
    /// # Errors
    ///
    /// See [`Plugin::prepare_artifacts`].
    pub fn prepare(
        &self,
        config: &PluginConfig,
        context: &ReleaseContext,
    ) -> Result<bool, ReleaseError> {
        self.prepare_artifacts(config, context).map(|_| true)
    }

    /// Generate every selected language artifact, returning the written files.
    ///
    /// The schemas loaded are the ones recorded by the last successful
    /// [`Plugin::verify_conditions`]; `config.schema_location` is not read
    /// again. Every other `config` field applies as passed.
    ///
    /// Not transactional: when a target fails, files written by earlier
    /// targets stay on disk.
    ///
    /// # Errors
    ///
    /// `ReleaseError::NotVerified` and `ReleaseError::NoVersion` before any
    /// I/O; load, title and dereference errors before any artifact is written;
    /// transpile, write and compile errors from the failing target.
    pub fn prepare_artifacts(
        &self,
        config: &PluginConfig,
        context: &ReleaseContext,
    ) -> Result<Prepared, ReleaseError> {
        let verification = self.verification.as_ref().ok_or(ReleaseError::NotVerified)?;
        let version = context.version().ok_or(ReleaseError::NoVersion)?;

        let cwd = context.working_dir();
        let outpath = config.resolve_outpath(&cwd);
        let languages = config.selected_languages();

        create_dir(&outpath)?;
        for language in &languages {
            for dir in emit::required_dirs(*language, config.compile) {
                create_dir(&outpath.join(dir))?;
            }
        }

        let paths = verification.schema_paths();
        let loaded = load_schemas(paths, &cwd)?;
        let primary = &loaded[0];
        let title = schema_title(&primary.value).ok_or_else(|| ReleaseError::NoTitle {
            path: primary.path.clone(),
        })?;

        let dereferenced = loaded
            .iter()
            .map(|schema| dereference(&schema.value, schema.path.parent().unwrap_or(&cwd)))
            .collect::<Result<Vec<Value>, _>>()?;

        let tsc = Tsc::new(config.tsc_command());
        let compiler: Option<&dyn TsCompiler> = match (&self.compiler, config.compile) {
            (_, false) => None,
            (Some(custom), true) => Some(custom.as_ref()),
            (None, true) => Some(&tsc),
        };

        let target = Target {
            schema: &primary.value,
            source: &primary.source,
            title,
            schemas: &dereferenced,
            outpath: &outpath,
            version,
            output_name: config.output_base_name(),
            compiler,
        };

        let mut prepared = Prepared::default();
        for language in languages {
            tracing::debug!(%language, "generating");
            let files = emit::generate(language, &self.transpiler, &target)?;
            tracing::info!(%language, files = files.len(), version, "generated");
            prepared.files.extend(files);
        }
        Ok(prepared)
    }
}

/// The title of a schema, if it yields at least one identifier word.
fn schema_title(schema: &Value) -> Option<&str> {
    schema
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !words(title).is_empty())
}

fn create_dir(path: &Path) -> Result<(), ReleaseError> {
    std::fs::create_dir_all(path).map_err(|source| ReleaseError::Write {
        path: path.to_path_buf(),
        source,
    })
}
