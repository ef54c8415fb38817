//! load → compute → emit for each dataset.

use std::path::PathBuf;

use chrono::NaiveDate;
use insights_analytics::campaign::compute_campaign_metrics;
use insights_analytics::customer::compute_customer_metrics;
use insights_analytics::loader::load_table;
use insights_analytics::schema::{campaign_schema, transaction_schema};
use insights_analytics::trends::{campaign_trends, customer_trends};
use insights_analytics::validation::{validate_campaigns, validate_transactions, ValidatedRows};
use insights_core::config::AppConfig;
use insights_core::error::InsightsResult;
use insights_core::types::MetricReport;
use insights_datagen::GenerationSummary;
use insights_reporting::{write_charts, write_metrics};
use tracing::{debug, info};

use crate::charts::{campaign_charts, customer_charts};

/// What one analysis run wrote.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: MetricReport,
    pub metrics_path: PathBuf,
    pub charts: Vec<PathBuf>,
}

pub fn run_generate(config: &AppConfig, today: NaiveDate) -> InsightsResult<GenerationSummary> {
    insights_datagen::generate_datasets(&config.generator, &config.paths, today)
}

pub fn run_customer_analysis(config: &AppConfig) -> InsightsResult<AnalysisOutcome> {
    let input = config.paths.transactions_path();
    let table = load_table(&input, &transaction_schema())?;
    let ValidatedRows { records, ledger } = validate_transactions(&table)?;
    ledger.log_summary("transactions");

    let metrics = compute_customer_metrics(&records, &config.retention, &config.segmentation);
    let mut report = metrics.to_report(&ledger);
    report.insert("pipeline", "customers");

    let metrics_path = config.paths.customer_metrics_path();
    write_metrics(&metrics_path, &report)?;

    let charts = if config.charts.enabled {
        let trends = customer_trends(&records, config.charts.histogram_bins);
        write_charts(
            &config.paths.output_dir,
            &customer_charts(&metrics, &trends),
            &config.charts,
        )?
    } else {
        debug!("Charts disabled");
        Vec::new()
    };

    info!(
        input = %input.display(),
        output = %metrics_path.display(),
        valid_rows = ledger.valid_rows(),
        excluded_rows = ledger.excluded_rows(),
        "Customer analysis complete"
    );
    Ok(AnalysisOutcome {
        report,
        metrics_path,
        charts,
    })
}

pub fn run_campaign_analysis(config: &AppConfig) -> InsightsResult<AnalysisOutcome> {
    let input = config.paths.campaigns_path();
    let table = load_table(&input, &campaign_schema())?;
    let ValidatedRows { records, ledger } = validate_campaigns(&table)?;
    ledger.log_summary("campaigns");

    let metrics = compute_campaign_metrics(&records);
    let mut report = metrics.to_report(&ledger);
    report.insert("pipeline", "campaigns");

    let metrics_path = config.paths.campaign_metrics_path();
    write_metrics(&metrics_path, &report)?;

    let charts = if config.charts.enabled {
        let trends = campaign_trends(&records);
        write_charts(
            &config.paths.output_dir,
            &campaign_charts(&metrics, &trends),
            &config.charts,
        )?
    } else {
        debug!("Charts disabled");
        Vec::new()
    };

    info!(
        input = %input.display(),
        output = %metrics_path.display(),
        valid_rows = ledger.valid_rows(),
        excluded_rows = ledger.excluded_rows(),
        "Campaign analysis complete"
    );
    Ok(AnalysisOutcome {
        report,
        metrics_path,
        charts,
    })
}
