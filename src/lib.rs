//! Adpulse
//!
//! Aggregates daily advertising-performance records into network-level
//! time series and delivers formatted insight reports to Slack.
//!
//! ## Pipeline
//!
//! Each run performs one strictly sequential cycle:
//!
//! 1. **Fetch**: [`warehouse::WarehouseClient`] retrieves the trailing
//!    window of dated rows from the analytics warehouse
//! 2. **Aggregate**: [`aggregate::aggregate`] groups rows into one
//!    [`models::DailyNetworkMetrics`] per (date, network) with derived
//!    CPT and ROAS; [`aggregate::summarize`] compares the two most recent
//!    windows
//! 3. **Render**: [`insights::render`] computes per-network rolling
//!    statistics and day-over-day deltas and emits the ordered report
//!    lines
//! 4. **Deliver**: [`slack::SlackClient`] posts the newline-joined report
//!    to the configured channel
//!
//! Failures are recovered at stage boundaries: a fetch or aggregation
//! error means "no data" and the run aborts before rendering; per-metric
//! arithmetic faults degrade into infinite/undefined change values inside
//! the renderer; a delivery failure is logged and reported as a boolean.
//!
//! ## Key Types
//!
//! - [`models::Record`] - raw warehouse row
//! - [`models::DailyNetworkMetrics`] - aggregated daily metrics per network
//! - [`models::PeriodSummary`] - week-over-week comparison
//! - [`models::SafeRatio`] - tagged division result carrying the
//!   divide-by-zero policy
//! - [`pipeline::InsightsPipeline`] - one-shot orchestration

pub mod aggregate;
pub mod config;
pub mod insights;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod slack;
pub mod warehouse;

pub use models::*;
pub use pipeline::InsightsPipeline;
