use std::path::Path;

use plotters::prelude::*;
use thiserror::Error;

use crate::domain::forecast::ForecastTable;

#[derive(Error, Debug)]
pub enum ForecastPlotError {
    #[error("forecast table has no periods to plot")]
    EmptyForecast,
    #[error("failed to render forecast plot: {0}")]
    Render(String),
}

/// Draws one bar per period spanning P10 to P90, with a marker at P50.
pub fn write_forecast_png<P: AsRef<Path>>(
    output_path: P,
    table: &ForecastTable,
) -> Result<(), ForecastPlotError> {
    if table.p50.is_empty() {
        return Err(ForecastPlotError::EmptyForecast);
    }
    render_forecast_png(output_path.as_ref(), table)
}

fn render_forecast_png(output_path: &Path, table: &ForecastTable) -> Result<(), ForecastPlotError> {
    let periods = table.p50.len();
    let max_value = table.p90.iter().copied().fold(0.0_f64, f64::max);
    let max_y = (max_value * 1.1).max(1.0);

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ForecastPlotError::Render(e.to_string()))?;

    let caption = format!("{} completed per period", table.statistic.label());
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(caption, ("sans-serif", 30))
        .x_label_area_size(55)
        .y_label_area_size(65)
        .build_cartesian_2d(0.0..periods as f64, 0.0..max_y)
        .map_err(|e| ForecastPlotError::Render(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Period")
        .y_desc(table.statistic.label())
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 22))
        .x_labels(periods.min(12))
        .x_label_formatter(&|value| format!("{}", value.floor() as usize + 1))
        .draw()
        .map_err(|e| ForecastPlotError::Render(e.to_string()))?;

    let band_color = RGBColor(160, 200, 235);
    let band_style = ShapeStyle::from(&band_color).filled();
    chart
        .draw_series((0..periods).map(|period| {
            let x = period as f64;
            Rectangle::new(
                [(x + 0.15, table.p10[period]), (x + 0.85, table.p90[period])],
                band_style,
            )
        }))
        .map_err(|e| ForecastPlotError::Render(e.to_string()))?;

    let median_color = RGBColor(30, 122, 204);
    let median_style = ShapeStyle::from(&median_color).filled();
    let marker = max_y / 200.0;
    chart
        .draw_series((0..periods).map(|period| {
            let x = period as f64;
            let p50 = table.p50[period];
            Rectangle::new([(x + 0.15, p50 - marker), (x + 0.85, p50 + marker)], median_style)
        }))
        .map_err(|e| ForecastPlotError::Render(e.to_string()))?;

    root.present()
        .map_err(|e| ForecastPlotError::Render(e.to_string()))?;
    Ok(())
}
