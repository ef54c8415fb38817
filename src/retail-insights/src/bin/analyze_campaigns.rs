//! Campaign pipeline: CTR, conversion rate, ROI and the ROI ranking from
//! `marketing_campaigns.csv`.

use anyhow::Context;
use clap::Parser;
use retail_insights::{init_tracing, run_campaign_analysis, CommonArgs};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "analyze-campaigns")]
#[command(about = "Compute campaign performance metrics and the ROI ranking")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

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
    if cli.no_charts {
        config.charts.enabled = false;
    }

    let outcome = run_campaign_analysis(&config)?;
    info!(
        metrics = %outcome.metrics_path.display(),
        charts = outcome.charts.len(),
        "Done"
    );
    Ok(())
}
