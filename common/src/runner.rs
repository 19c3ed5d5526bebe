use std::{collections::HashSet, path::PathBuf, process::Stdio, sync::Arc};

use eyre::{Context, Result};
use tokio::{fs::OpenOptions, io::AsyncWriteExt, process::Command};
use tracing::{debug, error};

use crate::{command::Invocation, error::SweepError};

pub const LABEL_PREFIX: &str = "datastructure: ";

/// Receives the marker lines of each block before its first repetition starts.
pub type Echo = Arc<dyn Fn(&str) + Send + Sync>;

pub fn stdout_echo() -> Echo {
    Arc::new(|markers: &str| print!("{markers}"))
}

/// Signatures already executed during this sweep.
#[derive(Debug, Default)]
pub struct RunLedger {
    seen: HashSet<String>,
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.seen.contains(signature)
    }

    /// Returns false if `signature` was already recorded.
    pub fn insert(&mut self, signature: String) -> bool {
        self.seen.insert(signature)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped,
    Completed { repetitions: usize },
}

/// Runs invocations one repetition at a time, appending their stdout to the results file.
pub struct Executor {
    results_file: PathBuf,
    rounds: usize,
    echo: Option<Echo>,
}

impl Executor {
    pub fn new(results_file: impl Into<PathBuf>, rounds: usize) -> Self {
        Self {
            results_file: results_file.into(),
            rounds,
            echo: Some(stdout_echo()),
        }
    }

    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.echo = Some(echo);
        self
    }

    /// Do not echo block markers.
    pub fn quiet(mut self) -> Self {
        self.echo = None;
        self
    }

    pub async fn execute_once(
        &self,
        ledger: &mut RunLedger,
        invocation: &Invocation,
        label: &str,
    ) -> Result<RunOutcome> {
        let signature = invocation.signature();
        if !ledger.insert(signature.clone()) {
            debug!("Already ran: {signature}");
            return Ok(RunOutcome::Skipped);
        }

        let markers = format!("{signature}\n{LABEL_PREFIX}{label}\n");
        if let Some(echo) = &self.echo {
            echo(&markers);
        }
        let mut file = self.open().await?;
        file.write_all(markers.as_bytes())
            .await
            .context("Write run markers")?;
        file.flush().await?;
        drop(file);

        for repetition in 1..=self.rounds {
            debug!("rep={repetition}/{} {signature}", self.rounds);
            let stdout = self.open().await?.into_std().await;
            let status = Command::new(&invocation.program)
                .args(&invocation.args)
                .envs(invocation.env.iter().map(|(k, v)| (k, v)))
                .stdout(Stdio::from(stdout))
                .stdin(Stdio::null())
                .status()
                .await
                .context(format!("Spawn {}", invocation.program))?;

            if !status.success() {
                error!("{signature} failed on repetition {repetition}: {status}");
                return Err(SweepError::BenchmarkProcessFailure {
                    invocation: signature,
                    repetition,
                    status,
                }
                .into());
            }
        }

        Ok(RunOutcome::Completed {
            repetitions: self.rounds,
        })
    }

    async fn open(&self) -> Result<tokio::fs::File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.results_file)
            .await
            .context(format!("Open results file {}", self.results_file.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::THREADS_ENV;

    fn shell(script: &str) -> Invocation {
        Invocation {
            env: vec![(THREADS_ENV.to_owned(), "3".to_owned())],
            program: "sh".to_owned(),
            args: vec!["-c".to_owned(), script.to_owned()],
        }
    }

    #[test]
    fn ledger_only_grows() {
        let mut ledger = RunLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.insert("a".to_owned()));
        assert!(!ledger.insert("a".to_owned()));
        assert!(ledger.insert("b".to_owned()));
        assert!(ledger.contains("a"));
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn second_execution_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("out.txt");
        let executor = Executor::new(&results, 3).quiet();
        let mut ledger = RunLedger::new();
        let invocation = shell("echo mops=1.0");

        let first = executor
            .execute_once(&mut ledger, &invocation, "harris_list")
            .await
            .unwrap();
        let second = executor
            .execute_once(&mut ledger, &invocation, "harris_list")
            .await
            .unwrap();
        assert_eq!(first, RunOutcome::Completed { repetitions: 3 });
        assert_eq!(second, RunOutcome::Skipped);

        let contents = std::fs::read_to_string(&results).unwrap();
        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                invocation.signature().as_str(),
                "datastructure: harris_list",
                "mops=1.0",
                "mops=1.0",
                "mops=1.0",
            ]
        );
    }

    #[tokio::test]
    async fn child_sees_worker_thread_env() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("out.txt");
        let executor = Executor::new(&results, 1).quiet();
        let mut ledger = RunLedger::new();
        executor
            .execute_once(&mut ledger, &shell("echo threads=$PARLAY_NUM_THREADS"), "x")
            .await
            .unwrap();
        let contents = std::fs::read_to_string(&results).unwrap();
        assert!(contents.ends_with("threads=3\n"));
    }

    #[tokio::test]
    async fn non_zero_exit_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("out.txt");
        let executor = Executor::new(&results, 3).quiet();
        let mut ledger = RunLedger::new();
        let invocation = shell("echo partial; exit 2");

        let err = executor
            .execute_once(&mut ledger, &invocation, "ellen")
            .await
            .unwrap_err();
        match err.downcast_ref::<SweepError>() {
            Some(SweepError::BenchmarkProcessFailure {
                invocation: failed,
                repetition,
                status,
            }) => {
                assert_eq!(failed, &invocation.signature());
                assert_eq!(*repetition, 1);
                assert_eq!(status.code(), Some(2));
            }
            other => panic!("unexpected error {other:?}"),
        }
        let contents = std::fs::read_to_string(&results).unwrap();
        assert_eq!(contents.lines().filter(|l| *l == "partial").count(), 1);
    }

    #[tokio::test]
    async fn markers_go_to_the_echo_once_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let echoed = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = echoed.clone();
        let executor = Executor::new(dir.path().join("out.txt"), 2)
            .with_echo(Arc::new(move |m: &str| sink.lock().unwrap().push(m.to_owned())));
        let mut ledger = RunLedger::new();
        let invocation = shell("echo mops=1.0");
        for _ in 0..2 {
            executor
                .execute_once(&mut ledger, &invocation, "natarajan")
                .await
                .unwrap();
        }
        assert_eq!(
            *echoed.lock().unwrap(),
            vec![format!("{invocation}\ndatastructure: natarajan\n")]
        );
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let executor = Executor::new(dir.path().join("out.txt"), 2).quiet();
        let mut ledger = RunLedger::new();
        let outcome = executor
            .execute_once(&mut ledger, &shell("exit 0"), "ellen")
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Completed { repetitions: 2 });
    }
}
