pub mod kpi;
pub mod metrics;
pub mod progress;
pub mod rebalancing;
pub mod scenarios;
