use common::aggregate::RunKey;

use crate::{Axis, Plot};

#[derive(Debug, Default, Clone, Copy)]
pub struct RatioPlot;

impl Plot for RatioPlot {
    fn name(&self) -> &'static str {
        "ratio"
    }

    fn axis(&self) -> Axis {
        Axis::Ratio
    }

    fn x_label(&self) -> &'static str {
        "Update ratio (%)"
    }

    fn title(&self, family: &str, fixed: &RunKey) -> String {
        format!(
            "{family}: {} threads, {} keys, zipfian {}",
            fixed.threads, fixed.size, fixed.skew
        )
    }
}
