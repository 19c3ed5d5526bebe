use common::aggregate::RunKey;

use crate::{Axis, Plot};

/// Throughput against thread count.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalabilityPlot;

impl Plot for ScalabilityPlot {
    fn name(&self) -> &'static str {
        "scalability"
    }

    fn axis(&self) -> Axis {
        Axis::Threads
    }

    fn x_label(&self) -> &'static str {
        "Threads"
    }

    fn title(&self, family: &str, fixed: &RunKey) -> String {
        format!(
            "{family}: {}% updates, {} keys, zipfian {}",
            fixed.ratio, fixed.size, fixed.skew
        )
    }
}
