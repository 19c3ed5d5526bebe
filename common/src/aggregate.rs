use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    path::Path,
};

use eyre::{Context, ContextCompat, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    command::THREADS_ENV,
    runner::LABEL_PREFIX,
    util::{mean_and_stddev, sorted_unique, unique_in_order},
};

/// Zipfian skew coefficient, totally ordered so it can key the series maps.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Skew(pub f64);

impl PartialEq for Skew {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Skew {}

impl Hash for Skew {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Skew {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Skew {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Skew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunKey {
    pub threads: usize,
    pub ratio: u32,
    pub size: u64,
    pub skew: Skew,
    pub algorithm: String,
}

/// Throughput (Mops/s) and its standard deviation per run, with the axis values seen.
#[derive(Debug, Default, Clone)]
pub struct Series {
    pub throughput: HashMap<RunKey, f64>,
    pub stddev: HashMap<RunKey, f64>,
    pub samples: HashMap<RunKey, usize>,
    pub threads: Vec<usize>,
    pub ratios: Vec<u32>,
    pub sizes: Vec<u64>,
    pub skews: Vec<Skew>,
    pub algorithms: Vec<String>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    algorithm: &'a str,
    threads: usize,
    size: u64,
    zipfian: f64,
    ratio: u32,
    mops: f64,
    stddev: f64,
    samples: usize,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.throughput.is_empty()
    }

    pub fn get(&self, key: &RunKey) -> Option<(f64, f64)> {
        Some((*self.throughput.get(key)?, *self.stddev.get(key)?))
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer =
            csv::Writer::from_path(path).context(format!("Create {}", path.display()))?;
        let mut keys = self.throughput.keys().collect::<Vec<_>>();
        keys.sort();
        for key in keys {
            writer.serialize(CsvRow {
                algorithm: &key.algorithm,
                threads: key.threads,
                size: key.size,
                zipfian: key.skew.0,
                ratio: key.ratio,
                mops: self.throughput[key],
                stddev: self.stddev.get(key).copied().unwrap_or_default(),
                samples: self.samples.get(key).copied().unwrap_or_default(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Parameters recovered from an invocation marker line.
#[derive(Debug, Clone, Copy)]
struct BlockParams {
    threads: usize,
    size: u64,
    ratio: u32,
    skew: f64,
}

pub struct Aggregator {
    re_threads: Regex,
    re_size: Regex,
    re_ratio: Regex,
    re_skew: Regex,
    re_throughput: Regex,
}

impl Aggregator {
    pub fn new(throughput_pattern: &str) -> Result<Self> {
        let re_throughput = Regex::new(throughput_pattern)
            .context(format!("Invalid throughput pattern {throughput_pattern}"))?;
        if re_throughput.captures_len() < 2 {
            eyre::bail!("Throughput pattern {throughput_pattern} needs a capture group");
        }
        Ok(Self {
            re_threads: Regex::new(r"\s-p\s+(\d+)")?,
            re_size: Regex::new(r"\s-n\s+(\d+)")?,
            re_ratio: Regex::new(r"\s-u\s+(\d+)")?,
            re_skew: Regex::new(r"\s-zp\s+([0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)")?,
            re_throughput,
        })
    }

    fn block_params(&self, line: &str) -> Result<BlockParams> {
        fn capture<T: std::str::FromStr>(re: &Regex, line: &str) -> Option<T> {
            re.captures(line)?.get(1)?.as_str().parse().ok()
        }
        Ok(BlockParams {
            threads: capture(&self.re_threads, line)
                .context(format!("No thread count in marker: {line}"))?,
            size: capture(&self.re_size, line).context(format!("No size in marker: {line}"))?,
            ratio: capture(&self.re_ratio, line)
                .context(format!("No update ratio in marker: {line}"))?,
            skew: capture(&self.re_skew, line).unwrap_or(0.0),
        })
    }

    /// Parses results file contents into per-run means and standard deviations.
    pub fn parse(&self, contents: &str) -> Result<Series> {
        let mut samples: HashMap<RunKey, Vec<f64>> = HashMap::new();
        let mut seen_algorithms = Vec::new();
        let mut params = None;
        let mut algorithm: Option<String> = None;
        let marker = format!("{THREADS_ENV}=");

        for line in contents.lines() {
            if line.starts_with(&marker) {
                params = Some(self.block_params(line)?);
                algorithm = None;
                continue;
            }
            if let Some(name) = line.strip_prefix(LABEL_PREFIX) {
                let name = name.trim().to_owned();
                seen_algorithms.push(name.clone());
                algorithm = Some(name);
                continue;
            }

            let Some(value) = self
                .re_throughput
                .captures(line)
                .and_then(|cap| cap.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
            else {
                continue;
            };

            match (&params, &algorithm) {
                (Some(p), Some(alg)) => samples
                    .entry(RunKey {
                        threads: p.threads,
                        ratio: p.ratio,
                        size: p.size,
                        skew: Skew(p.skew),
                        algorithm: alg.clone(),
                    })
                    .or_default()
                    .push(value),
                _ => warn!("Throughput outside of a run block: {line}"),
            }
        }

        let mut series = Series {
            threads: sorted_unique(samples.keys().map(|k| k.threads)),
            ratios: sorted_unique(samples.keys().map(|k| k.ratio)),
            sizes: sorted_unique(samples.keys().map(|k| k.size)),
            skews: sorted_unique(samples.keys().map(|k| k.skew)),
            algorithms: unique_in_order(
                seen_algorithms
                    .into_iter()
                    .filter(|alg| samples.keys().any(|k| &k.algorithm == alg)),
            ),
            ..Default::default()
        };
        for (key, values) in samples {
            let (mean, stddev) = mean_and_stddev(&values);
            series.samples.insert(key.clone(), values.len());
            series.throughput.insert(key.clone(), mean);
            series.stddev.insert(key, stddev);
        }
        debug!("Parsed {} runs", series.throughput.len());
        Ok(series)
    }
}
