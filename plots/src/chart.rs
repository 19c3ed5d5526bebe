use std::path::PathBuf;

use eyre::Result;
use plotters::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub err: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLine {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

/// A single line chart with error bars, one line per algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartJob {
    pub filepath: PathBuf,
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub log_x: bool,
    pub legend: bool,
    pub lines: Vec<ChartLine>,
}

impl ChartJob {
    fn to_x(&self, x: f64) -> f64 {
        if self.log_x { x.max(1.0).log10() } else { x }
    }

    fn x_range(&self) -> (f64, f64) {
        let xs = self
            .lines
            .iter()
            .flat_map(|l| l.points.iter().map(|p| self.to_x(p.x)));
        let (min, max) = xs.fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        if min > max {
            return (0.0, 1.0);
        }
        let pad = if max > min { (max - min) * 0.05 } else { 0.5 };
        (min - pad, max + pad)
    }

    fn y_max(&self) -> f64 {
        let max = self
            .lines
            .iter()
            .flat_map(|l| l.points.iter().map(|p| p.y + p.err))
            .fold(0.0, f64::max);
        if max > 0.0 { max * 1.1 } else { 1.0 }
    }
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn render(job: &ChartJob) -> Result<()> {
    let root = SVGBackend::new(&job.filepath, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_min, x_max) = job.x_range();
    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70);
    if let Some(title) = &job.title {
        builder.caption(title, ("sans-serif", 24));
    }
    let mut chart = builder.build_cartesian_2d(x_min..x_max, 0f64..job.y_max())?;

    let log_x = job.log_x;
    let x_formatter = move |v: &f64| {
        if log_x {
            format_tick(10f64.powf(*v).round())
        } else {
            format_tick(*v)
        }
    };
    chart
        .configure_mesh()
        .x_desc(job.x_label.as_str())
        .y_desc(job.y_label.as_str())
        .x_label_formatter(&x_formatter)
        .draw()?;

    for (idx, line) in job.lines.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points = line
            .points
            .iter()
            .map(|p| (job.to_x(p.x), p.y))
            .collect::<Vec<_>>();

        let anno = chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?;
        if job.legend {
            anno.label(line.label.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }
        chart.draw_series(line.points.iter().map(|p| {
            ErrorBar::new_vertical(
                job.to_x(p.x),
                p.y - p.err,
                p.y,
                p.y + p.err,
                color.filled(),
                8,
            )
        }))?;
        chart.draw_series(
            points
                .into_iter()
                .map(|point| Circle::new(point, 3, color.filled())),
        )?;
    }

    if job.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(filepath: PathBuf, log_x: bool) -> ChartJob {
        ChartJob {
            filepath,
            title: Some("lists".to_owned()),
            x_label: "Threads".to_owned(),
            y_label: "Mops/s".to_owned(),
            log_x,
            legend: true,
            lines: vec![ChartLine {
                label: "harris_list".to_owned(),
                points: vec![
                    ChartPoint { x: 10.0, y: 1.0, err: 0.1 },
                    ChartPoint { x: 1000.0, y: 4.0, err: 0.5 },
                ],
            }],
        }
    }

    #[test]
    fn ranges_cover_points_and_error_bars() {
        let linear = job(PathBuf::new(), false);
        let (lo, hi) = linear.x_range();
        assert!(lo < 10.0 && hi > 1000.0);
        assert!((linear.y_max() - 4.5 * 1.1).abs() < 1e-9);

        let log = job(PathBuf::new(), true);
        let (lo, hi) = log.x_range();
        assert!(lo < 1.0 && hi > 3.0 && hi < 4.0);
    }

    #[test]
    fn empty_chart_has_default_ranges() {
        let mut empty = job(PathBuf::new(), false);
        empty.lines.clear();
        assert_eq!(empty.x_range(), (0.0, 1.0));
        assert_eq!(empty.y_max(), 1.0);
    }

    #[test]
    fn renders_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        render(&job(path.clone(), true)).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("harris_list"));
    }
}
