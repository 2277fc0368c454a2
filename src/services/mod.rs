pub mod backlog_sizer;
pub mod consumption;
pub mod forecast_config;
pub mod forecast_plot;
pub mod forecast_report;
pub mod history_filter;
pub mod issue_table;
pub mod percentiles;
pub mod simulation;
pub mod size_distribution;
pub mod size_model;
pub mod sprint_simulator;
pub mod stats_aggregator;
pub mod throughput_model;
