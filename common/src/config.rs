use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs::read_to_string;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "sweep.yaml";
pub const DEFAULT_THROUGHPUT_PATTERN: &str = r"(?i)\bmops\s*[=:]\s*([0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory the benchmark executables live in
    pub bin_dir: PathBuf,
    pub results_dir: PathBuf,
    pub graphs_dir: PathBuf,
    /// Repetitions per configuration
    pub rounds: usize,
    /// Repetitions per configuration with `--test_only`
    pub test_rounds: usize,
    /// Value of `-tt`, kept as text so it renders exactly as written
    pub duration: String,
    pub test_duration: String,
    /// Wrap every invocation in `numactl -i all`
    pub numa_interleave: bool,
    pub extra_args: Vec<String>,
    /// Regex with one capture group extracting a throughput sample from benchmark output
    pub throughput_pattern: String,
    /// Per-algorithm executable overrides, relative to the working directory
    pub binaries: HashMap<String, PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from("."),
            results_dir: PathBuf::from("results"),
            graphs_dir: PathBuf::from("graphs"),
            rounds: 3,
            test_rounds: 1,
            duration: "1.0".to_owned(),
            test_duration: "0.01".to_owned(),
            numa_interleave: true,
            extra_args: Vec::new(),
            throughput_pattern: DEFAULT_THROUGHPUT_PATTERN.to_owned(),
            binaries: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn rounds(&self, test_only: bool) -> usize {
        if test_only {
            self.test_rounds
        } else {
            self.rounds
        }
    }

    pub fn duration(&self, test_only: bool) -> &str {
        if test_only {
            &self.test_duration
        } else {
            &self.duration
        }
    }

    /// Loads settings from `path`, else from [`DEFAULT_CONFIG_FILE`] when it exists, else defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("No {DEFAULT_CONFIG_FILE}, using default settings");
                    return Ok(Self::default());
                }
                default
            }
        };
        let settings: Settings = serde_yml::from_str(
            &read_to_string(&path)
                .await
                .context(format!("Reading config file {}", path.display()))?,
        )
        .context(format!("Parsing config file {}", path.display()))?;
        debug!("Loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let settings: Settings =
            serde_yml::from_str("rounds: 5\nnuma_interleave: false\nbin_dir: build\n").unwrap();
        assert_eq!(settings.rounds, 5);
        assert!(!settings.numa_interleave);
        assert_eq!(settings.bin_dir, PathBuf::from("build"));
        assert_eq!(settings.test_rounds, 1);
        assert_eq!(settings.duration(false), "1.0");
        assert_eq!(settings.duration(true), "0.01");
    }

    #[test]
    fn example_file_matches_defaults() {
        let example: Settings =
            serde_yml::from_str(include_str!("../../sweep.example.yaml")).unwrap();
        assert_eq!(example, Settings::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_yml::from_str::<Settings>("roundz: 5\n").is_err());
    }

    #[tokio::test]
    async fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "test_rounds: 2\nextra_args: [\"-trans\"]\n").unwrap();
        let settings = Settings::load(Some(path.as_path())).await.unwrap();
        assert_eq!(settings.rounds(true), 2);
        assert_eq!(settings.rounds(false), 3);
        assert_eq!(settings.extra_args, vec!["-trans".to_owned()]);
    }

    #[tokio::test]
    async fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        assert!(Settings::load(Some(path.as_path())).await.is_err());
    }
}
