use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use encoding_check::config::ConfigManager;
use encoding_check::{write_report, EncodingValidator, OutputFormat};

#[derive(Parser)]
#[command(
    name = "encoding_check",
    version,
    about = "Check that a file decodes strictly under one text encoding"
)]
struct Cli {
    /// File to check (defaults to `path` from the config file)
    path: Option<PathBuf>,

    /// Encoding label, e.g. utf-8, shift_jis, windows-1252
    #[arg(short, long)]
    encoding: Option<String>,

    /// Print the result as a JSON object
    #[arg(long)]
    json: bool,

    /// Config file to use instead of the one next to the executable
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    let config = manager
        .load()
        .with_context(|| format!("loading {}", manager.get_config_file_path().display()))?;

    let path = match cli.path {
        Some(path) => path,
        None if !config.path.is_empty() => PathBuf::from(&config.path),
        None => anyhow::bail!("no file given and no `path` in {}", config.config_file),
    };
    let label = cli.encoding.unwrap_or(config.encoding);
    let format = if cli.json { OutputFormat::Json } else { config.output };

    let validator = EncodingValidator::for_label(&label)?;
    tracing::debug!(encoding = validator.charset().name(), %label, "resolved encoding");

    let validation = validator.validate(&path);
    tracing::info!(path = %path.display(), valid = validation.is_valid(), "check finished");

    let stdout = std::io::stdout();
    write_report(&mut stdout.lock(), format, &path, validator.charset(), &validation)?;
    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("fatal: {e:#}");
        std::process::exit(2);
    }
}
