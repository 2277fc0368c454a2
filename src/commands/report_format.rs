use crate::domain::forecast::{Forecast, ForecastTable};

const DELIMITER: &str = "|";

/// Renders the forecast as `|`-delimited tables: completion chance per
/// backlog item first, then one table per statistic, separated by blank
/// lines.
pub fn format_forecast_tables(forecast: &Forecast) -> String {
    let mut sections = vec![format_completion_chance(forecast)];
    sections.extend(forecast.tables().into_iter().map(format_forecast_table));
    let mut output = sections.join("\n\n");
    output.push('\n');
    output
}

fn format_completion_chance(forecast: &Forecast) -> String {
    let mut lines = vec![header_row("Key", forecast.periods)];
    for row in &forecast.completion_chance {
        lines.push(value_row(&row.key, &row.chances));
    }
    lines.join("\n")
}

fn format_forecast_table(table: &ForecastTable) -> String {
    [
        header_row(table.statistic.label(), table.p50.len()),
        value_row("P10", &table.p10),
        value_row("P50", &table.p50),
        value_row("P90", &table.p90),
    ]
    .join("\n")
}

fn header_row(label: &str, periods: usize) -> String {
    std::iter::once(label.to_string())
        .chain((1..=periods).map(|period| format!("P{period}")))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

fn value_row(label: &str, values: &[f64]) -> String {
    std::iter::once(label.to_string())
        .chain(values.iter().map(|value| format!("{value:.2}")))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}
