mod commands;
mod error;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{completions, countries, normalize, Context};
use crate::error::{exit_code_for, report_error};
use phonenorm_config as config;
use phonenorm_core::Normalizer;

#[derive(Debug, Parser)]
#[command(name = "phonenorm", version, about = "phonenorm CLI")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a single phone number
    Normalize(normalize::NormalizeArgs),
    /// Normalize one phone number per line
    Batch(normalize::BatchArgs),
    /// List configured country rules
    Countries(countries::CountriesArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        command => {
            if verbose {
                match config::resolve_config_path(config_path.clone()) {
                    Ok(path) => debug!(path = %path.display(), "config resolved"),
                    Err(err) => debug!(error = %err, "config unavailable"),
                }
            }
            let registry = config::load(config_path).with_context(|| "load config")?;
            debug!(
                countries = registry.len(),
                default = %registry.default_country(),
                "registry ready"
            );
            let normalizer = Normalizer::new(registry);

            let ctx = Context {
                normalizer: &normalizer,
                json,
            };

            match command {
                Command::Normalize(args) => normalize::normalize(&ctx, args),
                Command::Batch(args) => normalize::batch(&ctx, args),
                Command::Countries(args) => countries::list_countries(&ctx, args),
                Command::Completions(_) => {
                    unreachable!("completions command handled before config loading")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
