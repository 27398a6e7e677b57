//! Core types for the release pipeline: target languages, plugin configuration
//! and the release context supplied by the host.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReleaseError;

/// Base file name used by single-file emission modes.
pub const DEFAULT_OUTPUT_NAME: &str = "generated-typings";

/// Compiler command used for the TypeScript full-compile variant.
pub const DEFAULT_TSC: &str = "tsc";

/// A generation target.
///
/// The set is closed; [`Language::ALL`] lists the targets in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ts")]
    TypeScript,
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "rs")]
    Rust,
    #[serde(rename = "py")]
    Python,
}

impl Language {
    /// Every target, in the order the pipeline emits them.
    pub const ALL: [Language; 4] = [
        Language::TypeScript,
        Language::Go,
        Language::Rust,
        Language::Python,
    ];

    /// Human-readable language name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Python => "Python",
        }
    }

    /// Parse a language from its flag or its name (case-insensitive).
    ///
    /// Returns `None` for unknown values (caller should error).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Some(Language::TypeScript),
            "go" | "golang" => Some(Language::Go),
            "rs" | "rust" => Some(Language::Rust),
            "py" | "python" => Some(Language::Python),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-language selection flags.
///
/// An unset flag means "skip that target", never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Languages {
    #[serde(default)]
    pub ts: bool,
    #[serde(default)]
    pub go: bool,
    #[serde(default)]
    pub rs: bool,
    #[serde(default)]
    pub py: bool,
}

impl Languages {
    /// Flags with exactly the given targets enabled.
    pub fn only(languages: &[Language]) -> Self {
        let mut flags = Self::default();
        for language in languages {
            match language {
                Language::TypeScript => flags.ts = true,
                Language::Go => flags.go = true,
                Language::Rust => flags.rs = true,
                Language::Python => flags.py = true,
            }
        }
        flags
    }

    pub fn is_enabled(&self, language: Language) -> bool {
        match language {
            Language::TypeScript => self.ts,
            Language::Go => self.go,
            Language::Rust => self.rs,
            Language::Python => self.py,
        }
    }
}

/// Where the schema documents live: one path or an ordered list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaLocation {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaLocation {
    /// Non-blank locations in configuration order.
    pub fn paths(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            SchemaLocation::Single(path) => vec![path.as_str()],
            SchemaLocation::Multiple(paths) => paths.iter().map(String::as_str).collect(),
        };
        all.into_iter().filter(|p| !p.trim().is_empty()).collect()
    }
}

impl From<&str> for SchemaLocation {
    fn from(path: &str) -> Self {
        SchemaLocation::Single(path.to_string())
    }
}

impl From<String> for SchemaLocation {
    fn from(path: String) -> Self {
        SchemaLocation::Single(path)
    }
}

impl From<Vec<String>> for SchemaLocation {
    fn from(paths: Vec<String>) -> Self {
        SchemaLocation::Multiple(paths)
    }
}

/// Options recognised by the plugin.
///
/// Keys are camelCase on the wire so the same document can be embedded in a
/// release host's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// Required schema sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<SchemaLocation>,
    /// Output root; defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outpath: Option<PathBuf>,
    /// Base file name for single-file emission modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
    /// Targets to emit. `None` emits all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Languages>,
    /// Compile the TypeScript output into `build/` instead of the single-file layout.
    #[serde(default)]
    pub compile: bool,
    /// TypeScript compiler command for the compile variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsc: Option<String>,
}

impl PluginConfig {
    /// Create a configuration for the given schema location with all defaults.
    pub fn new(location: impl Into<SchemaLocation>) -> Self {
        Self {
            schema_location: Some(location.into()),
            ..Self::default()
        }
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, ReleaseError> {
        serde_json::from_str(content).map_err(|e| ReleaseError::Config {
            message: e.to_string(),
        })
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ReleaseError> {
        let content = std::fs::read_to_string(path).map_err(|e| ReleaseError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content)
    }

    pub fn outpath(mut self, outpath: impl Into<PathBuf>) -> Self {
        self.outpath = Some(outpath.into());
        self
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    pub fn languages(mut self, languages: Languages) -> Self {
        self.languages = Some(languages);
        self
    }

    pub fn compile(mut self, compile: bool) -> Self {
        self.compile = compile;
        self
    }

    /// Configured schema paths, blank entries dropped.
    pub fn schema_paths(&self) -> Vec<&str> {
        self.schema_location
            .as_ref()
            .map(SchemaLocation::paths)
            .unwrap_or_default()
    }

    /// Targets to emit, in emission order.
    pub fn selected_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|lang| self.languages.map_or(true, |flags| flags.is_enabled(*lang)))
            .collect()
    }

    pub fn output_base_name(&self) -> &str {
        self.output_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_OUTPUT_NAME)
    }

    pub fn tsc_command(&self) -> &str {
        self.tsc.as_deref().unwrap_or(DEFAULT_TSC)
    }

    /// Output root resolved against the working directory.
    pub fn resolve_outpath(&self, cwd: &Path) -> PathBuf {
        match &self.outpath {
            Some(outpath) => cwd.join(outpath),
            None => cwd.to_path_buf(),
        }
    }
}

/// The upcoming release as announced by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextRelease {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Release metadata supplied by the host lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_release: Option<NextRelease>,
    /// Directory that relative paths resolve against. Defaults to the process
    /// working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl ReleaseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.next_release = Some(NextRelease {
            version: Some(version.into()),
        });
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// The next release version, if present and non-blank.
    pub fn version(&self) -> Option<&str> {
        self.next_release
            .as_ref()
            .and_then(|release| release.version.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn working_dir(&self) -> PathBuf {
        match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}
