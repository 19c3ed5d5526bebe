use std::sync::Arc;

use chrono::Local;
use common::{
    config::Settings,
    runner::RunOutcome,
    sweep::{Plan, Sweep},
};
use console::style;
use eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use plots::PlotInput;
use tracing::{debug, warn};

pub async fn run_sweep(
    sweep: Sweep<'_>,
    plan: &Plan,
    settings: &Settings,
    paper: bool,
    no_progress: bool,
) -> Result<()> {
    let started = Local::now();
    debug!(
        "{} sweep of {} over {} cells, results in {}",
        plan.grid.experiment_type,
        plan.grid.family,
        plan.grid.len(),
        plan.results_file.display()
    );

    let progress = if no_progress || plan.graphs_only {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(plan.grid.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}",
        )?);
        bar
    };
    let bar = progress.clone();
    let sweep = sweep.with_echo(Arc::new(move |markers: &str| {
        bar.suspend(|| print!("{markers}"))
    }));
    let summary = sweep
        .execute(plan, |config, outcome| {
            if outcome == RunOutcome::Skipped {
                progress.set_message(format!("{} (already ran)", config.algorithm));
            } else {
                progress.set_message(config.algorithm.clone());
            }
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();
    let summary = summary?;

    if !plan.graphs_only {
        println!(
            "{} {} configurations ({} duplicates skipped) in {}s",
            style("Ran").green().bold(),
            summary.executed,
            summary.skipped,
            (Local::now() - started).num_seconds()
        );
    }

    let series = sweep.aggregate(plan).await?;
    println!("threads: {:?}", series.threads);
    println!("update ratios: {:?}", series.ratios);
    println!("maxkeys: {:?}", series.sizes);
    println!(
        "alphas: {:?}",
        series.skews.iter().map(|s| s.0).collect::<Vec<_>>()
    );
    println!("algs: {:?}", series.algorithms);

    if series.is_empty() {
        warn!(
            "No throughput found in {}, nothing to plot",
            plan.results_file.display()
        );
        return Ok(());
    }

    let csv_path = plan.results_file.with_extension("csv");
    series.write_csv(&csv_path)?;

    let input = PlotInput {
        series: &series,
        algorithms: &plan.grid.algorithms,
        family: &plan.grid.family,
        paper,
    };
    let charts = plots::plot(plan.grid.experiment_type, &input, &settings.graphs_dir)?;
    println!(
        "{} {}, summary {}, {} charts in {}",
        style("Results").green().bold(),
        plan.results_file.display(),
        csv_path.display(),
        charts.len(),
        settings.graphs_dir.display()
    );
    Ok(())
}
