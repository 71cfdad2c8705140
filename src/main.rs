//! Cortexfig CLI - regenerate the paper figures from the published data.

use anyhow::Result;
use clap::Parser;
use cortexfig::figures::{self, Figure};
use cortexfig::{run_batch, FailureMode, FigureConfig, FigureContext};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cortexfig")]
#[command(about = "Reproduce the paper figures from the published data tables")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "cortexfig.toml")]
    config: PathBuf,

    /// Directory holding the input workbooks
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the figures are written to
    #[arg(long)]
    figures_dir: Option<PathBuf>,

    /// Stop at the first failing figure
    #[arg(long)]
    fail_fast: bool,

    /// Also write each figure's derived statistics as JSON
    #[arg(long)]
    save_stats: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render figures (all of them unless --only is given)
    Run {
        /// Figure ids to render, e.g. "1B,S4"
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// List the available figures
    List,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("cortexfig=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = FigureConfig::load(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.paths.data_dir = dir;
    }
    if let Some(dir) = cli.figures_dir {
        config.paths.figures_dir = dir;
    }
    config.output.save_stats |= cli.save_stats;
    config.run.fail_fast |= cli.fail_fast;

    let only = match cli.command.unwrap_or(Commands::Run { only: Vec::new() }) {
        Commands::List => {
            for figure in figures::registry() {
                println!("{:<5} {:<45} {}", figure.id(), figure.description(), figure.inputs().join(", "));
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Run { only } => only,
    };

    let selected: Vec<Box<dyn Figure>> = if only.is_empty() {
        figures::registry()
    } else {
        figures::select(&only)?
    };
    let mode = if config.run.fail_fast {
        FailureMode::FailFast
    } else {
        FailureMode::Continue
    };

    let ctx = FigureContext::from_config(&config);
    println!(
        "Rendering {} figure(s) from {} into {}",
        selected.len(),
        ctx.data_dir.display(),
        ctx.figures_dir.display()
    );
    let report = run_batch(&selected, &ctx, mode)?;

    println!();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(out) => println!(
                "  ok    {:<5} {} file(s) in {:.2}s",
                outcome.id,
                out.artifacts.len(),
                outcome.elapsed.as_secs_f64()
            ),
            Err(e) => println!("  FAIL  {:<5} {}", outcome.id, e),
        }
    }
    let skipped = selected.len() - report.outcomes.len();
    if skipped > 0 {
        println!("  {skipped} figure(s) skipped after the first failure");
    }

    if report.all_succeeded() {
        println!("Done! {} file(s) written", report.artifact_count());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} of {} figure(s) failed", report.failed().len(), report.outcomes.len());
        Ok(ExitCode::FAILURE)
    }
}
