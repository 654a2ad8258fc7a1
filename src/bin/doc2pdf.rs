//! CLI binary for doc2pdf-bot.
//!
//! `doc2pdf run` starts the Telegram bot; `doc2pdf convert` converts a single
//! local file. A thin shim that maps flags to the library's config types.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc2pdf_bot::{convert_async, validate, BotConfig, ConverterConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the bot (token from env or .env)
  TELEGRAM_BOT_TOKEN=123456:ABC doc2pdf run

  # Use soffice instead of the libreoffice wrapper
  doc2pdf run --converter soffice

  # Convert one file next to itself
  doc2pdf convert report.docx

  # Convert into another directory
  doc2pdf convert thesis.DOC -o out/

ENVIRONMENT VARIABLES:
  TELEGRAM_BOT_TOKEN      Bot token from @BotFather (required for `run`)
  DOC2PDF_CONVERTER       Converter program (default: libreoffice)
  DOC2PDF_API_URL         Bot API base URL (default: https://api.telegram.org)
  DOC2PDF_POLL_TIMEOUT    getUpdates long-poll timeout in seconds
  DOC2PDF_STAGING_DIR     Parent directory for per-request temp dirs
  RUST_LOG                Overrides --verbose / --quiet

A .env file in the working directory is loaded at start-up.
"#;

/// Telegram bot that converts .doc/.docx files to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "doc2pdf",
    version,
    about = "Convert .doc/.docx files to PDF, as a Telegram bot or one-off",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Converter program invoked with --headless --convert-to pdf.
    #[arg(long, global = true, env = "DOC2PDF_CONVERTER", default_value = "libreoffice")]
    converter: String,

    /// Extra argument passed to the converter before --headless (repeatable).
    #[arg(long = "converter-arg", global = true, allow_hyphen_values = true)]
    converter_args: Vec<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOC2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOC2PDF_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the Telegram bot until Ctrl-C.
    Run {
        /// Bot token from @BotFather.
        #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
        token: String,

        /// Bot API base URL.
        #[arg(long, env = "DOC2PDF_API_URL", default_value = doc2pdf_bot::config::DEFAULT_API_BASE_URL)]
        api_url: String,

        /// getUpdates long-poll timeout in seconds.
        #[arg(long, env = "DOC2PDF_POLL_TIMEOUT", default_value_t = 30,
              value_parser = clap::value_parser!(u64).range(1..=doc2pdf_bot::config::MAX_POLL_TIMEOUT_SECS))]
        poll_timeout: u64,

        /// Parent directory for per-request staging directories.
        #[arg(long, env = "DOC2PDF_STAGING_DIR")]
        staging_dir: Option<PathBuf>,
    },

    /// Convert one local .doc/.docx file.
    Convert {
        /// Path to the source document.
        input: PathBuf,

        /// Output directory (default: the input's directory).
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Run {
            ref token,
            ref api_url,
            poll_timeout,
            ref staging_dir,
        } => {
            let mut builder = BotConfig::builder(token.clone())
                .api_base_url(api_url.clone())
                .poll_timeout_secs(poll_timeout)
                .converter_program(cli.converter.clone())
                .converter_args(cli.converter_args.clone());
            if let Some(dir) = staging_dir {
                builder = builder.staging_root(dir.clone());
            }
            let config = builder.build().context("Invalid configuration")?;

            doc2pdf_bot::bot::run(config).await.context("Bot stopped")?;
        }
        Command::Convert {
            ref input,
            ref output_dir,
        } => {
            convert_one(input, output_dir.as_deref(), &cli).await?;
        }
    }

    Ok(())
}

/// Convert a single file with a spinner on stderr.
async fn convert_one(input: &Path, output_dir: Option<&Path>, cli: &Cli) -> Result<()> {
    // Fail fast on bad input before spinning anything up.
    validate(input).with_context(|| format!("Cannot convert {}", input.display()))?;

    let spinner = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    spinner.set_prefix("Converting");
    spinner.set_message(input.display().to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let start = Instant::now();
    let converter = ConverterConfig::new(cli.converter.clone()).with_args(cli.converter_args.clone());
    let result = convert_async(input, output_dir, &converter).await;
    spinner.finish_and_clear();

    match result {
        Ok(pdf) => {
            if !cli.quiet {
                eprintln!(
                    "{}  {}ms  →  {}",
                    green("✔"),
                    start.elapsed().as_millis(),
                    bold(&pdf.display().to_string())
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", red("✘"), e);
            Err(e).context("Conversion failed")
        }
    }
}
