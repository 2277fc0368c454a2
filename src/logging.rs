use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV_VAR: &str = "FORECAST_LOG";
pub const DEFAULT_LOG_FILTER: &str = "backlog_forecasts=info";

static INIT: Once = Once::new();

/// Installs the global subscriber. Log lines go to stderr so that stdout
/// carries only the forecast tables.
///
/// `FORECAST_LOG` takes the usual `EnvFilter` directives, for example
/// `FORECAST_LOG=backlog_forecasts::services=debug`. Safe to call more than
/// once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
