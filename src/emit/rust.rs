//! Rust output: a crate at the output root, `Cargo.toml` plus `src/lib.rs`.
//!
//! An existing manifest keeps everything but its `package.version`. A missing
//! or unreadable one is replaced by a fresh manifest carrying the
//! dependencies the generated serde code needs.

use std::path::PathBuf;

use toml::{Table, Value};

use super::{write_file, Target};
use crate::error::ReleaseError;
use crate::names::{leading_digit_safe, to_snake_case};

fn fresh_manifest(name: &str, version: &str) -> Table {
    let mut package = Table::new();
    package.insert("name".into(), Value::String(name.to_string()));
    package.insert("version".into(), Value::String(version.to_string()));
    package.insert("edition".into(), Value::String("2021".into()));

    let mut serde = Table::new();
    serde.insert("version".into(), Value::String("1".into()));
    serde.insert(
        "features".into(),
        Value::Array(vec![Value::String("derive".into())]),
    );

    let mut dependencies = Table::new();
    dependencies.insert("serde".into(), Value::Table(serde));
    dependencies.insert("serde_json".into(), Value::String("1".into()));

    let mut manifest = Table::new();
    manifest.insert("package".into(), Value::Table(package));
    manifest.insert("dependencies".into(), Value::Table(dependencies));
    manifest
}

/// Stamp `version` into an existing manifest, or build a fresh one.
///
/// A manifest that cannot be parsed, or that has no `[package]` table, is
/// replaced by a fresh one.
///
/// # Errors
///
/// Returns the serializer error if the merged table cannot be written back
/// as TOML.
pub fn merge_manifest(
    existing: Option<&str>,
    name: &str,
    version: &str,
) -> Result<String, toml::ser::Error> {
    let merged = existing.and_then(|content| match content.parse::<Table>() {
        Ok(mut manifest) => match manifest.get_mut("package") {
            Some(Value::Table(package)) => {
                package.insert("version".into(), Value::String(version.to_string()));
                Some(manifest)
            }
            _ => {
                tracing::warn!("existing Cargo.toml has no [package] table, regenerating");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "existing Cargo.toml is malformed, regenerating");
            None
        }
    });

    let manifest = merged.unwrap_or_else(|| fresh_manifest(name, version));
    toml::to_string(&manifest)
}

pub(super) fn emit(target: &Target<'_>, source: &str) -> Result<Vec<PathBuf>, ReleaseError> {
    let crate_name = leading_digit_safe(to_snake_case(target.title));
    let manifest_path = target.outpath.join("Cargo.toml");

    // Unreadable counts as absent
    let existing = std::fs::read_to_string(&manifest_path).ok();
    let manifest = merge_manifest(existing.as_deref(), &crate_name, target.version).map_err(
        |e| ReleaseError::Write {
            path: manifest_path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        },
    )?;

    Ok(vec![
        write_file(manifest_path, &manifest)?,
        write_file(target.outpath.join("src").join("lib.rs"), source)?,
    ])
}
