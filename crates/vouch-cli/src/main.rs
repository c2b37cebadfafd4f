//! vouch CLI - verify recorded HTTP responses against expectations

mod input;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use vouch_core::{Config, HttpResponse, VerificationReport};
use vouch_verify::{ExtensionRegistry, ResponseVerifier};

#[derive(Parser)]
#[command(name = "vouch")]
#[command(about = "Verify recorded HTTP responses against declarative expectations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Log level for diagnostics on stderr
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a recorded response
    Verify {
        /// Expected response (YAML, or JSON by extension)
        #[arg(short, long)]
        expect: PathBuf,

        /// Recorded response snapshot (YAML, or JSON by extension)
        #[arg(short, long)]
        response: PathBuf,

        /// Test name used in the report
        #[arg(short, long)]
        name: Option<String>,

        /// Config file (default: .vouch.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Template variable, overrides config (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the verification report
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        cli.log_level.into()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = init_logging(&cli).and_then(|()| run(cli));
    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Verify {
            expect,
            response,
            name,
            config,
            vars,
        } => {
            let mut cfg = match config {
                Some(path) => Config::load(&path)?,
                None => Config::load_default()?,
            };
            input::apply_vars(&mut cfg.variables, &vars)?;

            let expected = input::load_expected(&expect)?;
            let snapshot = input::load_snapshot(&response)?;
            let name = name.unwrap_or_else(|| default_name(&expect));

            // Extension functions are not shipped with the CLI
            let registry = ExtensionRegistry::new();
            let verifier = ResponseVerifier::from_config(&name, expected, &registry, &cfg)
                .with_context(|| format!("cannot verify '{name}'"))?;

            let response = HttpResponse::from(snapshot);
            let status_code = response.status;
            let outcome = verifier.evaluate(&response);
            let passed = outcome.passed();

            match cli.output {
                OutputFormat::Terminal => {
                    if passed {
                        println!("PASS {name}");
                        if !outcome.saved.is_empty() {
                            println!("\nSaved:");
                            for (key, value) in &outcome.saved {
                                println!("  {key} = {value}");
                            }
                        }
                    } else {
                        println!("FAIL {name}");
                        println!("{}", outcome.render());
                    }
                }
                OutputFormat::Json => {
                    let report = VerificationReport::new(&name, status_code, outcome);
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Silent => {}
            }

            Ok(if passed { 0 } else { 1 })
        }

        Commands::Init => {
            let config_path = ".vouch.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - variables: values for {{name}} placeholders");
            println!("  - redirect_header: header holding the redirect URL");
            Ok(0)
        }

        Commands::Schema => {
            println!("{}", vouch_core::report::generate_schema());
            Ok(0)
        }
    }
}

/// Test name from the expectation file's stem.
fn default_name(expect: &Path) -> String {
    expect
        .file_stem()
        .map_or_else(|| "response".to_string(), |s| s.to_string_lossy().into_owned())
}
