//! Batch driver: run figure units in order and report each outcome.

use crate::figures::{Figure, FigureContext, FigureOutput};
use crate::error::Result;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// What the batch does after a unit fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Keep going and report every failure at the end.
    #[default]
    Continue,
    FailFast,
}

#[derive(Debug)]
pub struct FigureOutcome {
    pub id: &'static str,
    pub elapsed: Duration,
    /// The unit's output, or its error rendered as text.
    pub result: std::result::Result<FigureOutput, String>,
}

impl FigureOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<FigureOutcome>,
}

impl RunReport {
    pub fn failed(&self) -> Vec<&FigureOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded()).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(FigureOutcome::succeeded)
    }

    pub fn artifact_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|out| out.artifacts.len())
            .sum()
    }
}

fn run_one(figure: &dyn Figure, ctx: &FigureContext) -> Result<FigureOutput> {
    let out = figure.render(ctx)?;
    if ctx.save_stats {
        out.save_stats(&ctx.figures_dir, figure.id())?;
    }
    Ok(out)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let reason = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("figure panicked: {reason}")
}

/// Run `figures` in order against one shared context.
///
/// Only a failure to create the output directory aborts the batch; unit
/// failures and panics land in the report.
pub fn run_batch(figures: &[Box<dyn Figure>], ctx: &FigureContext, mode: FailureMode) -> Result<RunReport> {
    fs::create_dir_all(&ctx.figures_dir)?;
    let mut report = RunReport::default();

    for figure in figures {
        info!(figure = figure.id(), "rendering {}", figure.description());
        let start = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| run_one(figure.as_ref(), ctx)));
        let elapsed = start.elapsed();

        let result = match result.map_err(|payload| panic_message(payload.as_ref())) {
            Ok(Ok(out)) => {
                info!(
                    figure = figure.id(),
                    artifacts = out.artifacts.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "figure done"
                );
                Ok(out)
            }
            Ok(Err(e)) => {
                error!(figure = figure.id(), error = %e, "figure failed");
                Err(e.to_string())
            }
            Err(reason) => {
                error!(figure = figure.id(), error = %reason, "figure panicked");
                Err(reason)
            }
        };
        let failed = result.is_err();
        report.outcomes.push(FigureOutcome {
            id: figure.id(),
            elapsed,
            result,
        });

        if failed && mode == FailureMode::FailFast {
            warn!(remaining = figures.len() - report.outcomes.len(), "stopping at first failure");
            break;
        }
    }

    Ok(report)
}
