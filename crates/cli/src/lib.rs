use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use headerdoc_pipeline::{DocProcessor, ExecutorOptions, RunStats, MAX_CONCURRENCY};
use headerdoc_transformer::{build_transformer, load_prompt, TransformerConfig};
use std::path::PathBuf;
use std::time::Duration;

mod flags;

use flags::TransformModeFlag;

#[derive(Parser)]
#[command(name = "headerdoc")]
#[command(about = "Generate markdown documentation for C/C++ headers", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory scanned for .h/.hpp headers
    #[arg(long)]
    input_dir: PathBuf,

    /// Directory receiving files/<rel>.md and index.md
    #[arg(long)]
    output_dir: PathBuf,

    /// Blocks transformed concurrently (overrides HEADERDOC_CONCURRENCY)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_CONCURRENCY as u64))]
    workers: Option<u64>,

    /// Attempts per block before the file is given up (overrides HEADERDOC_MAX_ATTEMPTS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=100))]
    retries: Option<u64>,

    /// Pause between attempts in milliseconds (overrides HEADERDOC_RETRY_DELAY_MS)
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Transformer backend (overrides HEADERDOC_TRANSFORM_MODE)
    #[arg(long, value_enum)]
    transform_mode: Option<TransformModeFlag>,

    /// Chat model id (overrides HEADERDOC_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// File holding the system prompt (overrides HEADERDOC_PROMPT_FILE)
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Skip hidden and .gitignore'd headers
    #[arg(long)]
    respect_ignore: bool,

    /// Print run statistics as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn transformer_config(&self) -> Result<TransformerConfig> {
        let mut config =
            TransformerConfig::from_env().context("Failed to read transformer settings")?;
        if let Some(mode) = self.transform_mode {
            config.mode = mode.as_domain();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(path) = &self.prompt_file {
            config.prompt = load_prompt(path)
                .with_context(|| format!("Failed to load prompt {}", path.display()))?;
        }
        Ok(config)
    }

    fn executor_options(&self) -> ExecutorOptions {
        let mut options = ExecutorOptions::from_env();
        if let Some(workers) = self.workers {
            options.concurrency = usize::try_from(workers).unwrap_or(MAX_CONCURRENCY);
        }
        if let Some(retries) = self.retries {
            options.retry.max_attempts = usize::try_from(retries).unwrap_or(1);
        }
        if let Some(delay) = self.retry_delay_ms {
            options.retry.delay = Duration::from_millis(delay);
        }
        options
    }
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout is reserved for the JSON report
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper connection chatter
    if !cli.verbose {
        builder.filter_module("hyper", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let stats = run(&cli).await?;
    report(&cli, &stats)
}

async fn run(cli: &Cli) -> Result<RunStats> {
    let config = cli.transformer_config()?;
    let transformer = build_transformer(&config).context("Failed to set up transformer")?;

    let options = cli.executor_options();
    log::info!(
        "Documenting {} into {} ({} workers, {} attempts per block, {} backend)",
        cli.input_dir.display(),
        cli.output_dir.display(),
        options.concurrency,
        options.retry.max_attempts,
        config.mode.as_str()
    );

    let processor =
        DocProcessor::new(transformer, options).with_ignore_rules(cli.respect_ignore);
    processor
        .make_doc(&cli.input_dir, &cli.output_dir)
        .await
        .with_context(|| format!("Failed to document {}", cli.input_dir.display()))
}

fn report(cli: &Cli, stats: &RunStats) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        eprintln!("{}", stats.summary());
        for error in &stats.errors {
            eprintln!("  failed: {error}");
        }
    }
    Ok(())
}
