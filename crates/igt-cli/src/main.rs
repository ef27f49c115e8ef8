use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use igt_core::app::{ExportStatus, SessionBuilder};
use igt_core::domain::SessionConfig;
use igt_core::impls::CsvExporter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod input;
mod terminal;

use input::StdinInput;
use terminal::TerminalPresenter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    /// Shuffled finite schedules, 120 main trials
    Scheduled,
    /// Independent sampling, 20 main trials
    Sampled,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Iowa Gambling Task in the terminal", long_about = None)]
struct Args {
    /// JSON session config; overrides --variant
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Variant::Scheduled)]
    variant: Variant,

    /// Skip registration (requires --name)
    #[arg(long)]
    participant_id: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Fixed RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(args: &Args) -> anyhow::Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SessionConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => match args.variant {
            Variant::Scheduled => SessionConfig::scheduled(),
            Variant::Sampled => SessionConfig::sampled(),
        },
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout belongs to the participant
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let presenter = TerminalPresenter::new(config.numerals);
    let exporter = CsvExporter::new(&args.output_dir, config.numerals);

    let mut builder = SessionBuilder::new(config, presenter, exporter);
    match (args.participant_id, args.name) {
        (Some(id), Some(name)) => builder = builder.with_participant(id, name),
        (None, None) => {}
        _ => bail!("--participant-id and --name must be given together"),
    }
    let runner = builder.build_runner().context("failed to set up session")?;
    info!(session_id = %runner.controller().session_id(), "session ready");

    let summary = runner
        .run(&mut StdinInput::new())
        .await
        .context("session aborted")?;

    match &summary.export {
        ExportStatus::Exported(receipt) => println!("Data saved to {}", receipt.location),
        ExportStatus::Failed(reason) => {
            warn!(%reason, "results were not saved");
            eprintln!("Results were not saved: {reason}");
        }
        ExportStatus::NotAttempted => {}
    }
    Ok(())
}
