//! TypeScript compilation for the full-compile output variant.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ReleaseError;

/// Compiler settings passed to `tsc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub target: String,
    pub module: String,
    pub lib: Vec<String>,
    pub declaration: bool,
    pub out_dir: PathBuf,
    pub strict: bool,
    pub es_module_interop: bool,
    pub resolve_json_module: bool,
}

impl CompilerOptions {
    /// The fixed configuration used for release builds: ES2015 output,
    /// CommonJS modules, declarations, JSON module resolution, strict mode.
    pub fn release(out_dir: &Path) -> Self {
        Self {
            target: "es6".to_string(),
            module: "commonjs".to_string(),
            lib: vec!["es2015".to_string()],
            declaration: true,
            out_dir: out_dir.to_path_buf(),
            strict: true,
            es_module_interop: true,
            resolve_json_module: true,
        }
    }

    /// Command-line form of the options.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--target".to_string(),
            self.target.clone(),
            "--module".to_string(),
            self.module.clone(),
        ];
        if !self.lib.is_empty() {
            args.push("--lib".to_string());
            args.push(self.lib.join(","));
        }
        if self.declaration {
            args.push("--declaration".to_string());
        }
        args.push("--outDir".to_string());
        args.push(self.out_dir.display().to_string());
        if self.strict {
            args.push("--strict".to_string());
        }
        if self.es_module_interop {
            args.push("--esModuleInterop".to_string());
        }
        if self.resolve_json_module {
            args.push("--resolveJsonModule".to_string());
        }
        args
    }
}

/// Something that can compile TypeScript sources.
pub trait TsCompiler {
    /// # Errors
    ///
    /// Returns `ReleaseError::Compile` when compilation fails.
    fn compile(&self, options: &CompilerOptions, files: &[PathBuf]) -> Result<(), ReleaseError>;
}

/// Runs an external `tsc` process.
#[derive(Debug, Clone)]
pub struct Tsc {
    command: String,
}

impl Tsc {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for Tsc {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_TSC)
    }
}

impl TsCompiler for Tsc {
    fn compile(&self, options: &CompilerOptions, files: &[PathBuf]) -> Result<(), ReleaseError> {
        let args = options.to_args();
        tracing::debug!(command = %self.command, ?args, "running TypeScript compiler");

        let output = Command::new(&self.command)
            .args(&args)
            .args(files)
            .output()
            .map_err(|e| ReleaseError::Compile {
                message: format!("cannot run {}: {}", self.command, e),
            })?;

        if output.status.success() {
            return Ok(());
        }

        // tsc reports diagnostics on stdout
        let mut message = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(stderr.trim());
        }
        if message.is_empty() {
            message = format!("{} exited with {}", self.command, output.status);
        }
        Err(ReleaseError::Compile { message })
    }
}
