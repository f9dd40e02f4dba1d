use crate::error::{ScheduleError, ScheduleResult};
use crate::plan::Schedule;
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use std::error::Error;
use std::path::Path;

const TITLE: &str = "Loan Balance Decline by Payment Frequency";
const SIZE: (u32, u32) = (1800, 1000);

// tab10
const SERIES_COLORS: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

#[derive(Clone, Debug, PartialEq)]
pub struct BalanceSeries {
    pub label: &'static str,
    /// (period, ending balance)
    pub points: Vec<(u32, f64)>,
}

/// Ending balance against period for every schedule, one series each.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceChart {
    pub title: String,
    pub series: Vec<BalanceSeries>,
}

impl BalanceChart {
    pub fn from_schedules(schedules: &[Schedule]) -> Self {
        let series = schedules
            .iter()
            .map(|schedule| BalanceSeries {
                label: schedule.plan.label(),
                points: schedule
                    .balances()
                    .into_iter()
                    .map(|(period, balance)| (period, balance.to_f64().unwrap_or(0.)))
                    .collect(),
            })
            .collect();
        Self {
            title: TITLE.to_string(),
            series,
        }
    }

    pub fn max_period(&self) -> u32 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(period, _)| period))
            .max()
            .unwrap_or(0)
    }

    pub fn max_balance(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, balance)| balance))
            .fold(0., f64::max)
    }

    pub fn render_png(&self, path: &Path) -> ScheduleResult<()> {
        self.draw(path).map_err(|err| ScheduleError::Chart {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn draw(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let y_max = (self.max_balance() * 1.05).max(1.);
        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 40))
            .margin(30)
            .x_label_area_size(60)
            .y_label_area_size(120)
            .build_cartesian_2d(0u32..self.max_period() + 1, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Period")
            .y_desc("Ending Balance ($)")
            .y_label_formatter(&|v| format!("{:.0}", v))
            .label_style(("sans-serif", 22))
            .draw()?;

        for (idx, series) in self.series.iter().enumerate() {
            let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
            chart
                .draw_series(LineSeries::new(
                    series.points.iter().copied(),
                    color.stroke_width(3),
                ))?
                .label(series.label)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(3))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", 24))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}
