use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::info;

use crate::commands::base_commands::ForecastArgs;
use crate::commands::report_format::format_forecast_tables;
use crate::services::forecast_config::{ForecastConfig, ForecastSettings};
use crate::services::forecast_plot::write_forecast_png;
use crate::services::forecast_report::{ForecastReportError, serialize_report_to_yaml};
use crate::services::simulation::{ForecastError, forecast_from_files};

pub fn forecast_command(args: &ForecastArgs) -> Result<(), ForecastError> {
    let file_settings = match &args.config {
        Some(path) => ForecastSettings::from_yaml_file(path)?,
        None => ForecastSettings::default(),
    };
    let config = ForecastConfig::from_settings(file_settings.merged_with(args.settings()))?;
    info!(runs = config.runs, periods = config.periods, "starting forecast");

    let report = forecast_from_files(&config)?;
    let tables = format_forecast_tables(&report.forecast);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &tables).map_err(ForecastReportError::from)?;
            println!("Forecast tables written to {}", path.display());
        }
        None => print!("{tables}"),
    }

    if let Some(path) = &args.report {
        let file = File::create(path).map_err(ForecastReportError::from)?;
        let mut writer = BufWriter::new(file);
        serialize_report_to_yaml(&mut writer, &report)?;
        writer.flush().map_err(ForecastReportError::from)?;
        eprintln!("Forecast report written to {}", path.display());
    }

    if let Some(path) = &args.plot {
        write_forecast_png(path, &report.forecast.items)?;
        eprintln!("Forecast plot written to {}", path.display());
    }

    if config.seed.is_none() {
        eprintln!("Base seed: {}", report.summary.base_seed);
    }
    Ok(())
}

