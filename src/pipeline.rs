//! Pipeline Orchestration
//!
//! Runs one fetch → aggregate → render → deliver cycle, strictly
//! sequential, with the stage-boundary error policy:
//!
//! - any error while fetching or aggregating surfaces as "no data" and
//!   aborts the run before anything is rendered or delivered,
//! - per-metric arithmetic degradation is handled inside the renderer and
//!   never reaches this level,
//! - a delivery failure is logged and reflected in the boolean outcome,
//!   with no retry.
//!
//! Re-running over the same input window reproduces the same output; the
//! pipeline holds no state across runs.

use crate::aggregate;
use crate::insights;
use crate::models::DailyNetworkMetrics;
use crate::slack::SlackClient;
use crate::warehouse::WarehouseClient;
use tracing::{error, info, warn};

pub struct InsightsPipeline {
    warehouse: WarehouseClient,
    slack: SlackClient,
    window_weeks: u32,
    networks: Vec<String>,
}

impl InsightsPipeline {
    /// Both clients are constructed by the caller and threaded in; the
    /// pipeline owns no connections of its own.
    pub fn new(
        warehouse: WarehouseClient,
        slack: SlackClient,
        window_weeks: u32,
        networks: Vec<String>,
    ) -> Self {
        Self {
            warehouse,
            slack,
            window_weeks,
            networks,
        }
    }

    /// Execute one full cycle. Returns whether the report was delivered.
    pub async fn run(&self) -> bool {
        let Some(table) = self.refresh_daily_data().await else {
            warn!("No data produced; skipping insight generation and delivery");
            return false;
        };

        if let Some(summary) = aggregate::summarize(&table) {
            info!(
                spend_change = summary.spend_change,
                cpt_change = summary.cpt_change,
                roas_change = summary.roas_change,
                revenue_change = summary.revenue_change,
                trials_change = summary.trials_change,
                "Week-over-week summary"
            );
        }

        let lines = insights::render(&table);
        if lines.is_empty() {
            warn!("Rendered no insight lines; nothing to deliver");
            return false;
        }

        match self.slack.post_message(&lines.join("\n")).await {
            Ok(()) => {
                info!(lines = lines.len(), "Insights sent to Slack");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to send insights to Slack");
                false
            }
        }
    }

    /// Fetch and aggregate as one fallible unit.
    ///
    /// Any error is absorbed here: the caller sees `None` ("no data") and
    /// must treat it as a full-pipeline failure signal. Partial results
    /// are never returned.
    pub async fn refresh_daily_data(&self) -> Option<Vec<DailyNetworkMetrics>> {
        match self
            .warehouse
            .fetch_records(self.window_weeks, &self.networks)
            .await
        {
            Ok(records) => Some(aggregate::aggregate(&records)),
            Err(e) => {
                error!(error = %e, "Error fetching or processing data");
                None
            }
        }
    }
}
