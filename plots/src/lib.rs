use std::{
    fs,
    path::{Path, PathBuf},
};

use common::{
    aggregate::{RunKey, Series, Skew},
    grid::ExperimentType,
};
use eyre::{Context, Result};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::debug;

pub mod chart;
mod ratio;
mod scalability;
mod size;
mod zipfian;

pub use chart::{ChartJob, ChartLine, ChartPoint};
pub use ratio::RatioPlot;
pub use scalability::ScalabilityPlot;
pub use size::SizePlot;
pub use zipfian::ZipfianPlot;

/// Everything a plotting routine needs from the sweep.
pub struct PlotInput<'a> {
    pub series: &'a Series,
    /// Algorithms of the family, in legend order
    pub algorithms: &'a [String],
    pub family: &'a str,
    /// Paper version: no title, no legend
    pub paper: bool,
}

/// The parameter plotted along the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Threads,
    Size,
    Skew,
    Ratio,
}

impl Axis {
    pub fn x(&self, key: &RunKey) -> f64 {
        match self {
            Axis::Threads => key.threads as f64,
            Axis::Size => key.size as f64,
            Axis::Skew => key.skew.0,
            Axis::Ratio => key.ratio as f64,
        }
    }

    /// `key` with the algorithm and this axis blanked, identifying the chart it belongs to.
    pub fn fixed(&self, key: &RunKey) -> RunKey {
        let mut fixed = RunKey {
            algorithm: String::new(),
            ..key.clone()
        };
        match self {
            Axis::Threads => fixed.threads = 0,
            Axis::Size => fixed.size = 0,
            Axis::Skew => fixed.skew = Skew(0.0),
            Axis::Ratio => fixed.ratio = 0,
        }
        fixed
    }

    /// Filename fragment naming the parameters held fixed.
    pub fn fixed_name(&self, fixed: &RunKey) -> String {
        let mut parts = Vec::new();
        if *self != Axis::Threads {
            parts.push(format!("p{}", fixed.threads));
        }
        if *self != Axis::Size {
            parts.push(format!("n{}", fixed.size));
        }
        if *self != Axis::Skew {
            parts.push(format!("z{}", fixed.skew));
        }
        if *self != Axis::Ratio {
            parts.push(format!("u{}", fixed.ratio));
        }
        parts.join("-")
    }
}

pub trait Plot: Send + Sync {
    fn name(&self) -> &'static str;
    fn axis(&self) -> Axis;
    fn x_label(&self) -> &'static str;
    fn title(&self, family: &str, fixed: &RunKey) -> String;
    fn log_x(&self) -> bool {
        false
    }

    /// One chart per combination of the parameters held fixed.
    fn jobs(&self, input: &PlotInput<'_>, out_dir: &Path) -> Vec<ChartJob> {
        let axis = self.axis();
        let mut charts = input
            .series
            .throughput
            .keys()
            .map(|k| axis.fixed(k))
            .collect::<Vec<_>>();
        charts.sort();
        charts.dedup();

        charts
            .into_iter()
            .map(|fixed| {
                let lines = input
                    .algorithms
                    .iter()
                    .filter_map(|alg| {
                        let mut points = input
                            .series
                            .throughput
                            .iter()
                            .filter(|(k, _)| &k.algorithm == alg && axis.fixed(k) == fixed)
                            .map(|(k, y)| ChartPoint {
                                x: axis.x(k),
                                y: *y,
                                err: input.series.stddev.get(k).copied().unwrap_or_default(),
                            })
                            .collect::<Vec<_>>();
                        if points.is_empty() {
                            return None;
                        }
                        points.sort_by(|a, b| a.x.total_cmp(&b.x));
                        Some(ChartLine {
                            label: alg.clone(),
                            points,
                        })
                    })
                    .collect();

                ChartJob {
                    filepath: out_dir.join(format!(
                        "{}-{}-{}.svg",
                        input.family,
                        self.name(),
                        axis.fixed_name(&fixed)
                    )),
                    title: (!input.paper).then(|| self.title(input.family, &fixed)),
                    x_label: self.x_label().to_owned(),
                    y_label: "Throughput (Mops/s)".to_owned(),
                    log_x: self.log_x(),
                    legend: !input.paper,
                    lines,
                }
            })
            .collect()
    }
}

pub fn plotter(experiment_type: ExperimentType) -> Box<dyn Plot> {
    match experiment_type {
        ExperimentType::Scalability => Box::new(ScalabilityPlot),
        ExperimentType::Size => Box::new(SizePlot),
        ExperimentType::Zipfian => Box::new(ZipfianPlot),
        ExperimentType::Ratio => Box::new(RatioPlot),
    }
}

/// Renders the charts for `experiment_type` into `out_dir`, returning the files written.
///
/// The data behind each chart is also dumped to `out_dir/plot_data/<name>.json`.
pub fn plot(
    experiment_type: ExperimentType,
    input: &PlotInput<'_>,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let plot_data_dir = out_dir.join("plot_data");
    fs::create_dir_all(&plot_data_dir).context(format!("Create {}", plot_data_dir.display()))?;

    let jobs = plotter(experiment_type).jobs(input, out_dir);
    debug!("{} charts for {experiment_type}", jobs.len());
    for job in &jobs {
        let stem = job
            .filepath
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("chart");
        fs::write(
            plot_data_dir.join(format!("{stem}.json")),
            serde_json::to_string(job)?,
        )?;
    }

    let rendered: Result<Vec<PathBuf>> = jobs
        .par_iter()
        .map(|job| {
            chart::render(job).context(format!("Render {}", job.filepath.display()))?;
            Ok(job.filepath.clone())
        })
        .collect();
    rendered
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn key(alg: &str, threads: usize, ratio: u32) -> RunKey {
        RunKey {
            threads,
            ratio,
            size: 1000,
            skew: Skew(0.0),
            algorithm: alg.to_owned(),
        }
    }

    fn series() -> Series {
        let mut throughput = HashMap::new();
        let mut stddev = HashMap::new();
        for (alg, base) in [("a", 1.0), ("b", 2.0)] {
            for threads in [4, 1, 2] {
                for ratio in [5, 50] {
                    throughput.insert(key(alg, threads, ratio), base * threads as f64);
                    stddev.insert(key(alg, threads, ratio), 0.1);
                }
            }
        }
        Series {
            throughput,
            stddev,
            threads: vec![1, 2, 4],
            ratios: vec![5, 50],
            sizes: vec![1000],
            skews: vec![Skew(0.0)],
            algorithms: vec!["a".to_owned(), "b".to_owned()],
            ..Default::default()
        }
    }

    #[test]
    fn dispatch_matches_experiment_type() {
        assert_eq!(plotter(ExperimentType::Scalability).axis(), Axis::Threads);
        assert_eq!(plotter(ExperimentType::Size).axis(), Axis::Size);
        assert_eq!(plotter(ExperimentType::Zipfian).axis(), Axis::Skew);
        assert_eq!(plotter(ExperimentType::Ratio).axis(), Axis::Ratio);
        assert!(plotter(ExperimentType::Size).log_x());
    }

    #[test]
    fn one_chart_per_fixed_combination() {
        let series = series();
        let algorithms = vec!["b".to_owned(), "missing".to_owned(), "a".to_owned()];
        let input = PlotInput {
            series: &series,
            algorithms: &algorithms,
            family: "lists",
            paper: false,
        };
        let jobs = ScalabilityPlot.jobs(&input, Path::new("graphs"));
        assert_eq!(jobs.len(), 2);
        assert_eq!(
            jobs[0].filepath,
            PathBuf::from("graphs/lists-scalability-n1000-z0-u5.svg")
        );
        let labels = jobs[0].lines.iter().map(|l| l.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["b", "a"]);
        let xs = jobs[0].lines[0].points.iter().map(|p| p.x).collect::<Vec<_>>();
        assert_eq!(xs, vec![1.0, 2.0, 4.0]);
        assert_eq!(jobs[0].lines[0].points[2].y, 8.0);
        assert!(jobs[0].title.is_some() && jobs[0].legend);
    }

    #[test]
    fn paper_version_drops_title_and_legend() {
        let series = series();
        let algorithms = series.algorithms.clone();
        let input = PlotInput {
            series: &series,
            algorithms: &algorithms,
            family: "lists",
            paper: true,
        };
        let jobs = RatioPlot.jobs(&input, Path::new("graphs"));
        assert_eq!(jobs.len(), 3);
        assert!(jobs.iter().all(|j| j.title.is_none() && !j.legend));
    }

    #[test]
    fn plot_writes_charts_and_data() {
        let dir = tempfile::tempdir().unwrap();
        let series = series();
        let algorithms = series.algorithms.clone();
        let input = PlotInput {
            series: &series,
            algorithms: &algorithms,
            family: "lists",
            paper: false,
        };
        let files = plot(ExperimentType::Scalability, &input, dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        for file in files {
            assert!(file.exists());
            let stem = file.file_stem().unwrap().to_str().unwrap().to_owned();
            assert!(dir.path().join("plot_data").join(format!("{stem}.json")).exists());
        }
    }
}
