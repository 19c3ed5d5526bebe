use std::path::PathBuf;

use eyre::{Context, Result};
use tokio::fs::read_to_string;
use tracing::{debug, info};

use crate::{
    aggregate::{Aggregator, Series},
    command::CommandBuilder,
    config::Settings,
    grid::{Grid, Param, RunConfig, resolve},
    registry::Registry,
    results::{SweepArgs, prepare_results_file, results_path},
    runner::{Echo, Executor, RunLedger, RunOutcome, stdout_echo},
};

/// Everything the user asked for, with list syntax already turned into [`Param`]s.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub args: SweepArgs,
    pub threads: Param<usize>,
    pub sizes: Param<u64>,
    pub skews: Param<f64>,
    pub ratios: Param<u32>,
    pub test_only: bool,
    pub graphs_only: bool,
}

/// A validated sweep. Creating one has no side effects.
#[derive(Debug, Clone)]
pub struct Plan {
    pub grid: Grid,
    pub results_file: PathBuf,
    pub test_only: bool,
    pub graphs_only: bool,
}

#[derive(Debug, Default)]
pub struct ExecutionSummary {
    pub executed: usize,
    pub skipped: usize,
    pub ledger: RunLedger,
}

pub struct Sweep<'a> {
    settings: &'a Settings,
    registry: Registry,
    cpus: usize,
    echo: Echo,
}

impl<'a> Sweep<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self::with_registry(settings, Registry::builtin(settings), num_cpus::get())
    }

    pub fn with_registry(settings: &'a Settings, registry: Registry, cpus: usize) -> Self {
        Self {
            settings,
            registry,
            cpus,
            echo: stdout_echo(),
        }
    }

    /// Where block markers are echoed while the sweep runs; stdout by default.
    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.echo = echo;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn plan(&self, request: SweepRequest) -> Result<Plan> {
        let grid = resolve(
            &self.registry,
            &request.args.datastructures,
            request.threads,
            request.sizes,
            request.skews,
            request.ratios,
        )?;
        debug!(
            "type={} cells={} sparse={}",
            grid.experiment_type,
            grid.len(),
            grid.sparse
        );
        Ok(Plan {
            grid,
            results_file: results_path(&self.settings.results_dir, &request.args),
            test_only: request.test_only,
            graphs_only: request.graphs_only,
        })
    }

    /// Write phase: runs every distinct grid cell in order, one process at a time.
    ///
    /// `on_cell` is called after each cell, whether it ran or was already covered.
    pub async fn execute(
        &self,
        plan: &Plan,
        mut on_cell: impl FnMut(&RunConfig, RunOutcome),
    ) -> Result<ExecutionSummary> {
        prepare_results_file(&plan.results_file, plan.graphs_only).await?;
        let mut summary = ExecutionSummary::default();
        if plan.graphs_only {
            info!("Graphs only, reusing {}", plan.results_file.display());
            return Ok(summary);
        }

        let builder =
            CommandBuilder::with_cpus(&self.registry, self.settings, plan.test_only, self.cpus);
        let executor = Executor::new(&plan.results_file, self.settings.rounds(plan.test_only))
            .with_echo(self.echo.clone());

        for config in plan.grid.configs(&self.settings.extra_args) {
            let invocation = builder.build(&config)?;
            let outcome = executor
                .execute_once(&mut summary.ledger, &invocation, &config.algorithm)
                .await?;
            match outcome {
                RunOutcome::Skipped => summary.skipped += 1,
                RunOutcome::Completed { .. } => summary.executed += 1,
            }
            on_cell(&config, outcome);
        }

        info!(
            "Ran {} configurations, skipped {} duplicates",
            summary.executed, summary.skipped
        );
        Ok(summary)
    }

    /// Read phase: parses the results file written by [`Sweep::execute`].
    pub async fn aggregate(&self, plan: &Plan) -> Result<Series> {
        let contents = read_to_string(&plan.results_file)
            .await
            .context(format!("Reading {}", plan.results_file.display()))?;
        Aggregator::new(&self.settings.throughput_pattern)?.parse(&contents)
    }
}
