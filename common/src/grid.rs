use std::fmt;

use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::{error::SweepError, registry::Registry};

/// A parameter field: either held fixed or swept over a list of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Param<T> {
    Scalar(T),
    Sweep(Vec<T>),
}

impl<T> Param<T> {
    pub fn is_sweep(&self) -> bool {
        matches!(self, Param::Sweep(_))
    }

    fn into_values(self) -> Vec<T> {
        match self {
            Param::Scalar(value) => vec![value],
            Param::Sweep(values) => values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentType {
    Scalability,
    Size,
    Zipfian,
    Ratio,
}

impl ExperimentType {
    pub fn name(&self) -> &'static str {
        match self {
            ExperimentType::Scalability => "scalability",
            ExperimentType::Size => "size",
            ExperimentType::Zipfian => "zipfian",
            ExperimentType::Ratio => "ratio",
        }
    }

    /// The CLI field this experiment sweeps over.
    pub fn field(&self) -> &'static str {
        match self {
            ExperimentType::Scalability => "threads",
            ExperimentType::Size => "sizes",
            ExperimentType::Zipfian => "zipfians",
            ExperimentType::Ratio => "ratios",
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub algorithm: String,
    pub threads: usize,
    pub size: u64,
    pub skew: f64,
    pub ratio: u32,
    pub sparse: bool,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub experiment_type: ExperimentType,
    pub family: String,
    pub algorithms: Vec<String>,
    pub threads: Vec<usize>,
    pub sizes: Vec<u64>,
    pub skews: Vec<f64>,
    pub ratios: Vec<u32>,
    pub sparse: bool,
}

impl Grid {
    /// Cartesian product in execution order: algorithm, then threads, size, skew, ratio.
    pub fn configs<'a>(&'a self, extra: &'a [String]) -> impl Iterator<Item = RunConfig> + 'a {
        iproduct!(
            self.algorithms.iter(),
            self.threads.iter(),
            self.sizes.iter(),
            self.skews.iter(),
            self.ratios.iter()
        )
        .map(move |(algorithm, threads, size, skew, ratio)| RunConfig {
            algorithm: algorithm.clone(),
            threads: *threads,
            size: *size,
            skew: *skew,
            ratio: *ratio,
            sparse: self.sparse,
            extra: extra.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
            * self.threads.len()
            * self.sizes.len()
            * self.skews.len()
            * self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Determines the swept dimension and expands the grid for `family`.
///
/// Exactly one of the four fields must be a [`Param::Sweep`]. Sweep values keep their given order.
pub fn resolve(
    registry: &Registry,
    family: &str,
    threads: Param<usize>,
    sizes: Param<u64>,
    skews: Param<f64>,
    ratios: Param<u32>,
) -> Result<Grid, SweepError> {
    let family = registry.family(family)?;

    let candidates = [
        (ExperimentType::Scalability, threads.is_sweep(), sweep_len(&threads)),
        (ExperimentType::Size, sizes.is_sweep(), sweep_len(&sizes)),
        (ExperimentType::Zipfian, skews.is_sweep(), sweep_len(&skews)),
        (ExperimentType::Ratio, ratios.is_sweep(), sweep_len(&ratios)),
    ];
    let swept = candidates
        .iter()
        .filter(|(_, is_sweep, _)| *is_sweep)
        .collect::<Vec<_>>();

    let experiment_type = match swept.as_slice() {
        [] => return Err(SweepError::NoSweepDimension),
        [(kind, _, len)] => {
            if *len == 0 {
                return Err(SweepError::EmptySweep(kind.field()));
            }
            *kind
        }
        many => {
            return Err(SweepError::MultipleSweepDimensions(
                many.iter().map(|(kind, _, _)| kind.field()).collect(),
            ));
        }
    };

    Ok(Grid {
        experiment_type,
        family: family.name.clone(),
        algorithms: family.algorithms.clone(),
        threads: threads.into_values(),
        sizes: sizes.into_values(),
        skews: skews.into_values(),
        ratios: ratios.into_values(),
        sparse: family.sparse,
    })
}

fn sweep_len<T>(param: &Param<T>) -> usize {
    match param {
        Param::Scalar(_) => 1,
        Param::Sweep(values) => values.len(),
    }
}
