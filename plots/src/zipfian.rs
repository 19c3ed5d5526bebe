use common::aggregate::RunKey;

use crate::{Axis, Plot};

#[derive(Debug, Default, Clone, Copy)]
pub struct ZipfianPlot;

impl Plot for ZipfianPlot {
    fn name(&self) -> &'static str {
        "zipfian"
    }

    fn axis(&self) -> Axis {
        Axis::Skew
    }

    fn x_label(&self) -> &'static str {
        "Zipfian parameter"
    }

    fn title(&self, family: &str, fixed: &RunKey) -> String {
        format!(
            "{family}: {} threads, {}% updates, {} keys",
            fixed.threads, fixed.ratio, fixed.size
        )
    }
}
