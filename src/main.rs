use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;

use adpulse::aggregate::{aggregate, summarize};
use adpulse::config::{get_config, Config};
use adpulse::insights;
use adpulse::logging::init_logging;
use adpulse::pipeline::InsightsPipeline;
use adpulse::slack::SlackClient;
use adpulse::warehouse::WarehouseClient;

#[derive(Parser)]
#[command(name = "adpulse")]
#[command(about = "Daily advertising-performance insights delivered to Slack")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, aggregate, and deliver today's insights to Slack
    Run,
    /// Render today's insights to stdout without delivering them
    Preview {
        /// Output the metrics table and summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run().await,
        Commands::Preview { json } => preview(json).await,
    }
}

async fn run() -> Result<()> {
    let config = get_config();
    if let Err(e) = config.require_delivery_settings() {
        eprintln!("❌ {}", e);
        process::exit(1);
    }

    let warehouse = build_warehouse(config)?;
    let slack = SlackClient::new(&config.slack.token, &config.slack.channel_id)?;
    let pipeline = InsightsPipeline::new(
        warehouse,
        slack,
        config.warehouse.window_weeks,
        config.warehouse.networks.clone(),
    );

    if pipeline.run().await {
        Ok(())
    } else {
        process::exit(1);
    }
}

async fn preview(json: bool) -> Result<()> {
    let config = get_config();
    if let Err(e) = config.require_fetch_settings() {
        eprintln!("❌ {}", e);
        process::exit(1);
    }

    let warehouse = build_warehouse(config)?;
    let records = warehouse
        .fetch_records(config.warehouse.window_weeks, &config.warehouse.networks)
        .await?;
    let table = aggregate(&records);

    if json {
        let output = serde_json::json!({
            "metrics": table,
            "summary": summarize(&table),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if table.is_empty() {
        println!("No ad-performance data found for the configured window.");
        return Ok(());
    }

    println!("\n{}", "=".repeat(60).bright_cyan());
    println!("{}", "Ad Performance Insights Preview".bright_white().bold());
    println!("{}", "=".repeat(60).bright_cyan());
    println!();
    for line in insights::render(&table) {
        println!("{}", line);
    }
    Ok(())
}

fn build_warehouse(config: &Config) -> Result<WarehouseClient> {
    WarehouseClient::new(&config.warehouse.base_url, &config.warehouse.token)
}
