use std::path::PathBuf;

use clap::Parser;
use common::{
    config::Settings,
    results::SweepArgs,
    sweep::{Sweep, SweepRequest},
};
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod args;
mod run;

const MODULES: &[&str] = &["common", "plots"];

/// Runs concurrent data structure benchmarks over a parameter sweep and plots the results.
///
/// Exactly one of THREADS, SIZES, ZIPFIANS and RATIOS must be a list such as `[1,2,4]`.
#[derive(Parser)]
struct Cli {
    /// One of lists, trees, sets, btrees, with-vs-try-lock
    datastructures: String,
    /// Number of threads
    threads: String,
    /// Initial size
    sizes: String,
    /// Zipfian parameter, in [0, 1)
    zipfians: String,
    /// Update ratio, between 0 and 100
    ratios: String,
    /// Short runs, one repetition each
    #[arg(short = 't', long = "test_only", default_value_t = false)]
    test_only: bool,
    /// Skip the benchmarks and plot the existing results file
    #[arg(short = 'g', long = "graphs_only", default_value_t = false)]
    graphs_only: bool,
    /// Paper version of graphs, no title or legend
    #[arg(short = 'p', long = "paper_ver", default_value_t = false)]
    paper_ver: bool,
    /// Settings file, defaults to sweep.yaml when present
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long = "no_progress", default_value_t = false)]
    no_progress: bool,
    /// Extra tracing directives, e.g. `common=debug`
    #[arg(short, long)]
    log: Vec<String>,
}

impl Cli {
    fn request(&self) -> Result<SweepRequest> {
        Ok(SweepRequest {
            args: SweepArgs {
                datastructures: self.datastructures.clone(),
                threads: self.threads.clone(),
                sizes: self.sizes.clone(),
                zipfians: self.zipfians.clone(),
                ratios: self.ratios.clone(),
            },
            threads: args::parse_threads(&self.threads)?,
            sizes: args::parse_param("sizes", &self.sizes)?,
            skews: args::parse_zipfians(&self.zipfians)?,
            ratios: args::parse_ratios(&self.ratios)?,
            test_only: self.test_only,
            graphs_only: self.graphs_only,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();

    println!("datastructures: {}", args.datastructures);
    println!("threads: {}", args.threads);
    println!("sizes: {}", args.sizes);
    println!("zipfians: {}", args.zipfians);
    println!("ratios: {}", args.ratios);

    // nothing may be written, log file included, until the sweep is known to be valid
    let settings = Settings::load(args.config.as_deref()).await?;
    let sweep = Sweep::new(&settings);
    let plan = sweep.plan(args.request()?)?;

    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("ds_sweep={log_level}"));
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }
    for module in MODULES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    let result = run::run_sweep(sweep, &plan, &settings, args.paper_ver, args.no_progress).await;
    if let Err(err) = result {
        error!("{err:#?}");
        return Err(err);
    }
    Ok(())
}
