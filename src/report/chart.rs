//! Bar charts of the two rankings, rendered to SVG with plotters.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::markdown::format_usd;
use crate::error::{ReportError, Result};
use crate::pipeline::processing::aggregate::{CategoryTotals, Measure};

pub const HARM_CHART_FILE: &str = "harm.svg";
pub const DAMAGE_CHART_FILE: &str = "damage.svg";

const CHART_SIZE: (u32, u32) = (1200, 640);
const BAR_COLOR: RGBColor = RGBColor(70, 110, 170);

/// One labelled bar
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// A titled series of bars over one measure
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub measure: Measure,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Bars for `rows` in their ranked order.
    pub fn from_totals(title: impl Into<String>, measure: Measure, rows: &[CategoryTotals]) -> Self {
        Self {
            title: title.into(),
            measure,
            bars: rows
                .iter()
                .map(|row| Bar {
                    label: row.category.clone(),
                    value: row.value(measure),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    fn axis_label(&self, value: f64) -> String {
        if self.measure.is_monetary() {
            format_usd(value)
        } else {
            format!("{:.0}", value)
        }
    }
}

/// Render `chart` as an SVG document.
pub fn render_svg(chart: &BarChart) -> Result<String> {
    if chart.is_empty() {
        return Err(ReportError::Chart(format!("'{}' has no bars", chart.title)));
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw(&root, chart).map_err(|e| ReportError::Chart(e.to_string()))?;
        root.present().map_err(|e| ReportError::Chart(e.to_string()))?;
    }
    Ok(svg)
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &BarChart,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let max = chart.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    let top = if max > 0.0 { max * 1.1 } else { 1.0 };
    let count = chart.bars.len() as i32;

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d((0..count).into_segmented(), 0f64..top)?;

    let category = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => chart
            .bars
            .get(*i as usize)
            .map(|b| b.label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    let amount = |v: &f64| chart.axis_label(*v);

    ctx.configure_mesh()
        .disable_x_mesh()
        // One key point per segment boundary so every bar gets its label
        .x_labels(chart.bars.len() + 1)
        .x_label_formatter(&category)
        .y_label_formatter(&amount)
        .y_desc(chart.measure.label())
        .draw()?;

    ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        let i = i as i32;
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value)],
            BAR_COLOR.filled(),
        );
        rect.set_margin(0, 0, 8, 8);
        rect
    }))?;

    Ok(())
}
