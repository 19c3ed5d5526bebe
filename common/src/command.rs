use std::fmt;

use crate::{config::Settings, error::SweepError, grid::RunConfig, registry::Registry};

/// Worker-thread environment variable read by the benchmark runtime.
pub const THREADS_ENV: &str = "PARLAY_NUM_THREADS";

/// A fully resolved benchmark invocation.
///
/// Its [`Display`](fmt::Display) rendering is the invocation signature used for deduplication
/// and written as the block marker in the results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub env: Vec<(String, String)>,
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn signature(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

pub struct CommandBuilder<'a> {
    registry: &'a Registry,
    settings: &'a Settings,
    cpus: usize,
    test_only: bool,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(registry: &'a Registry, settings: &'a Settings, test_only: bool) -> Self {
        Self::with_cpus(registry, settings, test_only, num_cpus::get())
    }

    pub fn with_cpus(
        registry: &'a Registry,
        settings: &'a Settings,
        test_only: bool,
        cpus: usize,
    ) -> Self {
        Self {
            registry,
            settings,
            cpus,
            test_only,
        }
    }

    pub fn build(&self, config: &RunConfig) -> Result<Invocation, SweepError> {
        let binary = self.registry.binary(&config.algorithm)?;
        let binary = binary.display().to_string();

        // never fewer workers than cores, whatever the requested thread count
        let workers = config.threads.max(self.cpus);

        let (program, mut args) = if self.settings.numa_interleave {
            (
                "numactl".to_owned(),
                vec!["-i".to_owned(), "all".to_owned(), binary],
            )
        } else {
            (binary, Vec::new())
        };

        args.extend([
            "-r".to_owned(),
            "1".to_owned(),
            "-p".to_owned(),
            config.threads.to_string(),
            "-fixed_time".to_owned(),
        ]);
        args.extend(config.extra.iter().cloned());
        if config.skew > 0.0 {
            args.extend(["-z".to_owned(), "-zp".to_owned(), config.skew.to_string()]);
        }
        if config.sparse {
            args.push("-sparse".to_owned());
        }
        args.extend([
            "-n".to_owned(),
            config.size.to_string(),
            "-u".to_owned(),
            config.ratio.to_string(),
            "-no_check".to_owned(),
            "-v".to_owned(),
            "-tt".to_owned(),
            self.settings.duration(self.test_only).to_owned(),
        ]);

        Ok(Invocation {
            env: vec![(THREADS_ENV.to_owned(), workers.to_string())],
            program,
            args,
        })
    }
}
