//! Per-language artifact emission.
//!
//! Each target renders its source through the [`Transpiler`] and writes one or
//! more files at deterministic paths under the output root. Targets never
//! write outside their own files, so a failure in one leaves the others'
//! output untouched.

mod go;
mod python;
mod rust;
mod ts;

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ReleaseError;
use crate::transpiler::Transpiler;
use crate::tsc::TsCompiler;
use crate::types::Language;

pub use rust::merge_manifest;

/// Everything an emitter needs to know about the current release.
pub struct Target<'a> {
    /// Primary schema as loaded, before dereferencing.
    pub schema: &'a Value,
    /// Primary schema file text, byte for byte.
    pub source: &'a str,
    /// Primary schema title.
    pub title: &'a str,
    /// Dereferenced schema set handed to the transpiler.
    pub schemas: &'a [Value],
    pub outpath: &'a Path,
    pub version: &'a str,
    /// Base file name for single-file TypeScript output.
    pub output_name: &'a str,
    /// Set for the TypeScript full-compile variant.
    pub compiler: Option<&'a dyn TsCompiler>,
}

/// Subdirectories of the output root a target writes into.
pub fn required_dirs(language: Language, compile: bool) -> &'static [&'static str] {
    match language {
        Language::TypeScript if compile => &["src", "build"],
        Language::Rust => &["src"],
        _ => &[],
    }
}

/// Render and write one target. Returns the written paths.
///
/// # Errors
///
/// Returns `ReleaseError::Transpile` if rendering fails, `ReleaseError::Write`
/// if a file cannot be written, or `ReleaseError::Compile` from the
/// TypeScript compile variant.
pub fn generate(
    language: Language,
    transpiler: &dyn Transpiler,
    target: &Target<'_>,
) -> Result<Vec<PathBuf>, ReleaseError> {
    let source = transpiler
        .render(language, target.schemas)
        .map_err(|source| ReleaseError::Transpile { language, source })?;

    match language {
        Language::TypeScript => ts::emit(target, &source),
        Language::Go => go::emit(target, &source),
        Language::Rust => rust::emit(target, &source),
        Language::Python => python::emit(target, &source),
    }
}

pub(crate) fn write_file(path: PathBuf, contents: &str) -> Result<PathBuf, ReleaseError> {
    std::fs::write(&path, contents).map_err(|source| ReleaseError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(path)
}
