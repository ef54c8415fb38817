//! Customer pipeline: retention, churn, purchase behaviour and spend tiers
//! from `customer_transactions.csv`.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use retail_insights::{init_tracing, run_customer_analysis, CommonArgs};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "analyze-customers")]
#[command(about = "Compute customer retention, churn and value metrics")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// First day of the later retention window, YYYY-MM-DD (default: midpoint)
    #[arg(long)]
    split_date: Option<NaiveDate>,

    /// Days without an order before a customer counts as inactive
    #[arg(long)]
    inactivity_days: Option<i64>,

    /// Skip chart rendering
    #[arg(long, default_value_t = false)]
    no_charts: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.log_format);

    let mut config = cli
        .common
        .load_config()
        .context("failed to load configuration")?;
    if cli.split_date.is_some() {
        config.retention.split_date = cli.split_date;
    }
    if let Some(days) = cli.inactivity_days {
        config.retention.inactivity_days = days;
    }
    if cli.no_charts {
        config.charts.enabled = false;
    }
    config.validate()?;

    let outcome = run_customer_analysis(&config)?;
    info!(
        metrics = %outcome.metrics_path.display(),
        charts = outcome.charts.len(),
        "Done"
    );
    Ok(())
}
