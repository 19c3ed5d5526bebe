use common::aggregate::RunKey;

use crate::{Axis, Plot};

#[derive(Debug, Default, Clone, Copy)]
pub struct SizePlot;

impl Plot for SizePlot {
    fn name(&self) -> &'static str {
        "size"
    }

    fn axis(&self) -> Axis {
        Axis::Size
    }

    fn x_label(&self) -> &'static str {
        "Initial size (keys)"
    }

    // sizes usually span several orders of magnitude
    fn log_x(&self) -> bool {
        true
    }

    fn title(&self, family: &str, fixed: &RunKey) -> String {
        format!(
            "{family}: {} threads, {}% updates, zipfian {}",
            fixed.threads, fixed.ratio, fixed.skew
        )
    }
}
