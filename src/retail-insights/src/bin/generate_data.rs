//! Writes synthetic `customer_transactions.csv` and `marketing_campaigns.csv`.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use retail_insights::{init_tracing, run_generate, CommonArgs};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "generate-data")]
#[command(about = "Generate synthetic retail transaction and campaign data")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Random seed; unset draws one from OS entropy (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of distinct customers (overrides config)
    #[arg(long)]
    customers: Option<usize>,

    /// Number of orders before dirty rows are added (overrides config)
    #[arg(long)]
    transactions: Option<usize>,

    /// Number of campaigns (overrides config)
    #[arg(long)]
    campaigns: Option<usize>,

    /// Length of the generated window in days (overrides config)
    #[arg(long)]
    days: Option<u32>,

    /// Last day of generated activity, YYYY-MM-DD (default: today)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Fraction of transaction rows made malformed (overrides config)
    #[arg(long)]
    dirty_row_rate: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.log_format);

    let mut config = cli
        .common
        .load_config()
        .context("failed to load configuration")?;

    let generator = &mut config.generator;
    if cli.seed.is_some() {
        generator.seed = cli.seed;
    }
    if let Some(n) = cli.customers {
        generator.customers = n;
    }
    if let Some(n) = cli.transactions {
        generator.transactions = n;
    }
    if let Some(n) = cli.campaigns {
        generator.campaigns = n;
    }
    if let Some(days) = cli.days {
        generator.days = days;
    }
    if cli.end_date.is_some() {
        generator.end_date = cli.end_date;
    }
    if let Some(rate) = cli.dirty_row_rate {
        generator.dirty_row_rate = rate;
    }
    config.validate()?;

    let today = chrono::Local::now().date_naive();
    let summary = run_generate(&config, today)?;
    info!(
        seed = summary.seed,
        transaction_rows = summary.transaction_rows,
        campaign_rows = summary.campaign_rows,
        dirty_rows = summary.dirty.total(),
        "Synthetic data generated"
    );
    Ok(())
}
