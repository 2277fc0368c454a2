pub mod calendar;
pub mod forecast;
pub mod issue;
pub mod throughput;
