//! Error types for the verify and prepare stages.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::types::Language;

/// Errors reported to the release host.
///
/// Every variant maps to a stable release-error code (see [`ReleaseError::code`]).
#[derive(Debug, Error)]
pub enum ReleaseError {
    // Configuration errors (exit code 1)
    #[error("You must provide a schema location")]
    MissingSchemaLocation,

    #[error("The schema must have a title")]
    NoTitle { path: PathBuf },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    // State gates (exit code 1)
    #[error("Not verified")]
    NotVerified,

    #[error("No nextRelease version")]
    NoVersion,

    // IO errors (exit code 3)
    #[error("Cannot find schema: {}", display_paths(paths))]
    SchemaNotFound { paths: Vec<PathBuf> },

    #[error("cannot read {path}: {source}")]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Schema errors (exit code 2)
    #[error("invalid JSON in {path}: {source}")]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} is not a valid JSON Schema: {message}")]
    SchemaInvalid { path: PathBuf, message: String },

    #[error("failed to load {} schemas: {}", failures.len(), display_failures(failures))]
    SchemaLoad { failures: Vec<ReleaseError> },

    #[error("failed to dereference \"{reference}\": {message}")]
    Dereference { reference: String, message: String },

    // Generation errors (exit code 4)
    #[error("failed to render {language} source: {source}")]
    Transpile {
        language: Language,
        #[source]
        source: TranspileError,
    },

    #[error("TypeScript compilation failed: {message}")]
    Compile { message: String },
}

/// Failures raised by a transpiler backend.
#[derive(Debug, Error)]
pub enum TranspileError {
    #[error("no schemas to render")]
    Empty,

    #[error("cannot derive a type name for schema at {path}")]
    Unnamed { path: String },

    #[error("{0}")]
    Backend(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_failures(failures: &[ReleaseError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ReleaseError {
    /// Stable code identifying the failure to the host.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSchemaLocation => "ESCHEMALOCATION",
            Self::NoTitle { .. } => "ENOTITLE",
            Self::Config { .. } => "ECONFIG",
            Self::NotVerified => "ENOTVERIFIED",
            Self::NoVersion => "ENOVERSION",
            Self::SchemaNotFound { .. } => "ESCHEMANOTFOUND",
            Self::SchemaRead { .. } => "ESCHEMAREAD",
            Self::Write { .. } => "EWRITE",
            Self::SchemaParse { .. } => "ESCHEMAPARSE",
            Self::SchemaInvalid { .. } => "ESCHEMAINVALID",
            Self::SchemaLoad { .. } => "ESCHEMALOAD",
            Self::Dereference { .. } => "EDEREFERENCE",
            Self::Transpile { .. } => "ETRANSPILE",
            Self::Compile { .. } => "ECOMPILE",
        }
    }

    /// Longer explanation shown alongside the message.
    pub fn details(&self) -> String {
        match self {
            Self::MissingSchemaLocation => {
                "The transpiler requires a schema. Set `schemaLocation` to a path or a list of paths."
                    .to_string()
            }
            Self::NoTitle { path } => format!(
                "Schema {} requires a title; it is used to name the generated artifacts.",
                path.display()
            ),
            Self::Config { .. } => "Check the plugin configuration.".to_string(),
            Self::NotVerified => {
                "Something went wrong and the schemas were not able to be verified.".to_string()
            }
            Self::NoVersion => {
                "Something went wrong and there is no next release version.".to_string()
            }
            Self::SchemaNotFound { paths } => format!(
                "Please check that your schemaLocation is properly set. Received: {}",
                display_paths(paths)
            ),
            Self::SchemaRead { path, .. } | Self::SchemaParse { path, .. } => {
                format!("The schema at {} could not be loaded.", path.display())
            }
            Self::SchemaInvalid { path, .. } => format!(
                "The document at {} does not conform to the JSON Schema meta-schema.",
                path.display()
            ),
            Self::SchemaLoad { failures } => display_failures(failures),
            Self::Dereference { reference, .. } => format!(
                "The reference \"{}\" could not be resolved; no artifacts were generated.",
                reference
            ),
            Self::Write { path, .. } => {
                format!("Generated output could not be written to {}.", path.display())
            }
            Self::Transpile { language, .. } => {
                format!("The {} transpiler rejected the schema.", language)
            }
            Self::Compile { .. } => {
                "The TypeScript compiler failed; other targets' files were left in place."
                    .to_string()
            }
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingSchemaLocation
            | Self::NoTitle { .. }
            | Self::Config { .. }
            | Self::NotVerified
            | Self::NoVersion => 1,
            Self::SchemaParse { .. }
            | Self::SchemaInvalid { .. }
            | Self::Dereference { .. } => 2,
            Self::SchemaNotFound { .. } | Self::SchemaRead { .. } | Self::Write { .. } => 3,
            Self::Transpile { .. } | Self::Compile { .. } => 4,
            Self::SchemaLoad { failures } => failures.first().map_or(2, Self::exit_code),
        }
    }
}

/// Error object handed to the release host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticReleaseError {
    pub message: String,
    pub code: String,
    pub details: String,
    /// Marks the error as a recognised release-pipeline error.
    pub semantic_release: bool,
}

impl From<&ReleaseError> for SemanticReleaseError {
    fn from(err: &ReleaseError) -> Self {
        Self {
            message: err.to_string(),
            code: err.code().to_string(),
            details: err.details(),
            semantic_release: true,
        }
    }
}

impl std::fmt::Display for SemanticReleaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
