use std::path::{Path, PathBuf};

use eyre::{Context, Result, bail};
use tokio::fs::{File, create_dir_all};
use tracing::debug;

/// Raw CLI text of the five positional arguments, used to name the results file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepArgs {
    pub datastructures: String,
    pub threads: String,
    pub sizes: String,
    pub zipfians: String,
    pub ratios: String,
}

impl SweepArgs {
    pub fn stem(&self) -> String {
        [
            self.datastructures.as_str(),
            self.threads.as_str(),
            self.sizes.as_str(),
            self.zipfians.as_str(),
            self.ratios.as_str(),
        ]
        .join("-")
    }
}

/// `<dir>/<family>-<threads>-<sizes>-<zipfians>-<ratios>.txt`, from the unexpanded arguments.
pub fn results_path(dir: &Path, args: &SweepArgs) -> PathBuf {
    dir.join(format!("{}.txt", args.stem()))
}

/// Truncates the results file for a fresh sweep, or checks it exists when only re-plotting.
pub async fn prepare_results_file(path: &Path, graphs_only: bool) -> Result<()> {
    if graphs_only {
        if !path.exists() {
            bail!(
                "No results file at {} to plot, run the sweep without --graphs_only first",
                path.display()
            );
        }
        debug!("Reusing {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .await
            .context(format!("Create {}", parent.display()))?;
    }
    File::create(path)
        .await
        .context(format!("Truncate results file {}", path.display()))?;
    debug!("Cleared {}", path.display());
    Ok(())
}
