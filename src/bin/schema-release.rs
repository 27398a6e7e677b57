//! Schema Release CLI
//!
//! Runs the verify and prepare steps the way a release host would.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use schema_release::{
    Language, Languages, Plugin, PluginConfig, ReleaseContext, ReleaseError, SchemaLocation,
    SemanticReleaseError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-release")]
#[command(about = "Generate TypeScript, Go, Rust and Python artifacts from a JSON Schema")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the configured schema files exist
    Verify {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Verify, then generate every selected language for a release
    Prepare {
        #[command(flatten)]
        config: ConfigArgs,

        /// Version of the upcoming release (e.g., 1.4.0)
        #[arg(long)]
        release_version: Option<String>,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Plugin configuration file (JSON). Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Schema file; repeat for several schemas
    #[arg(long = "schema")]
    schemas: Vec<String>,

    /// Output root (default: working directory)
    #[arg(long)]
    outpath: Option<PathBuf>,

    /// Base file name for single-file TypeScript output
    #[arg(long)]
    output_name: Option<String>,

    /// Language to generate (ts, go, rs, py); repeat to select several. Default: all
    #[arg(long = "lang", value_parser = parse_language)]
    languages: Vec<Language>,

    /// Compile the TypeScript output with tsc into build/
    #[arg(long)]
    compile: bool,

    /// TypeScript compiler command
    #[arg(long)]
    tsc: Option<String>,

    /// Directory relative paths resolve against (default: current directory)
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Report failures as JSON release errors on stdout
    #[arg(long)]
    json: bool,
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::parse(s).ok_or_else(|| format!("unknown language \"{}\": expected ts, go, rs or py", s))
}

impl ConfigArgs {
    fn plugin_config(&self) -> Result<PluginConfig, ReleaseError> {
        let mut config = match &self.config {
            Some(path) => PluginConfig::from_file(path)?,
            None => PluginConfig::default(),
        };
        match self.schemas.as_slice() {
            [] => {}
            [single] => config.schema_location = Some(SchemaLocation::from(single.clone())),
            many => config.schema_location = Some(SchemaLocation::from(many.to_vec())),
        }
        if let Some(outpath) = &self.outpath {
            config.outpath = Some(outpath.clone());
        }
        if let Some(name) = &self.output_name {
            config.output_name = Some(name.clone());
        }
        if !self.languages.is_empty() {
            config.languages = Some(Languages::only(&self.languages));
        }
        if self.compile {
            config.compile = true;
        }
        if let Some(tsc) = &self.tsc {
            config.tsc = Some(tsc.clone());
        }
        Ok(config)
    }

    fn context(&self, version: Option<String>) -> ReleaseContext {
        let mut context = ReleaseContext::new();
        if let Some(version) = version {
            context = context.with_version(version);
        }
        if let Some(cwd) = &self.cwd {
            context = context.with_cwd(cwd.clone());
        }
        context
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Verify { config } => run_verify(&config),
        Commands::Prepare {
            config,
            release_version,
        } => run_prepare(&config, release_version),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_verify(args: &ConfigArgs) -> Result<(), u8> {
    let config = args.plugin_config().map_err(|e| report_error(args.json, &e))?;
    let context = args.context(None);

    let mut plugin = Plugin::new();
    plugin
        .verify_conditions(&config, &context)
        .map_err(|e| report_error(args.json, &e))?;

    if let Some(verification) = plugin.verification() {
        for path in verification.schema_paths() {
            println!("Verified {}", path.display());
        }
    }
    Ok(())
}

fn run_prepare(args: &ConfigArgs, version: Option<String>) -> Result<(), u8> {
    let config = args.plugin_config().map_err(|e| report_error(args.json, &e))?;
    let context = args.context(version);

    let mut plugin = Plugin::new();
    plugin
        .verify_conditions(&config, &context)
        .map_err(|e| report_error(args.json, &e))?;
    let prepared = plugin
        .prepare_artifacts(&config, &context)
        .map_err(|e| report_error(args.json, &e))?;

    for file in &prepared.files {
        println!("{}", file.display());
    }
    Ok(())
}

/// Output an error in plain text or as a JSON release error, returning its exit code.
fn report_error(json_output: bool, err: &ReleaseError) -> u8 {
    if json_output {
        let shaped = SemanticReleaseError::from(err);
        match serde_json::to_string(&shaped) {
            Ok(json) => println!("{}", json),
            Err(_) => eprintln!("Error: {}", shaped),
        }
    } else {
        eprintln!("Error [{}]: {}", err.code(), err);
        eprintln!("  {}", err.details());
    }
    err.exit_code() as u8
}
