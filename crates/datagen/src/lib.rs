//! Synthetic input data for the retail insights pipelines.

pub mod generator;

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use insights_analytics::schema::{campaigns, transactions};
use insights_core::config::{GeneratorConfig, PathsConfig};
use insights_core::error::{InsightsError, InsightsResult};
use rand::Rng;
use tracing::info;

pub use generator::{DataGenerator, DirtyCounts};

pub const TRANSACTION_HEADER: [&str; 6] = [
    transactions::TRANSACTION_ID,
    transactions::CUSTOMER_ID,
    transactions::ORDER_DATE,
    transactions::ORDER_AMOUNT,
    transactions::CATEGORY,
    transactions::SIGNUP_DATE,
];

pub const CAMPAIGN_HEADER: [&str; 8] = [
    campaigns::CAMPAIGN_ID,
    campaigns::DATE,
    campaigns::CHANNEL,
    campaigns::SPEND,
    campaigns::IMPRESSIONS,
    campaigns::CLICKS,
    campaigns::CONVERSIONS,
    campaigns::REVENUE,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub seed: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub transaction_rows: usize,
    pub campaign_rows: usize,
    pub dirty: DirtyCounts,
}

/// Write a header and rows to `path`, replacing any existing file.
pub fn write_csv<const N: usize>(
    path: &Path,
    header: [&str; N],
    rows: &[[String; N]],
) -> InsightsResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let csv_err = |e: csv::Error| InsightsError::Generate(format!("{}: {e}", path.display()));

    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(header).map_err(csv_err)?;
    for row in rows {
        wtr.write_record(row).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Generate both input files into `paths.data_dir`.
///
/// An unset seed draws one from OS entropy; the seed used is logged and
/// returned so a run can be reproduced.
pub fn generate_datasets(
    config: &GeneratorConfig,
    paths: &PathsConfig,
    today: NaiveDate,
) -> InsightsResult<GenerationSummary> {
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut generator = DataGenerator::new(config, seed, today)?;
    info!(
        seed,
        start = %generator.start_date(),
        end = %generator.end_date(),
        "Generating synthetic data"
    );

    let (transaction_rows, dirty) = generator.transaction_rows();
    let transactions_path = paths.transactions_path();
    write_csv(&transactions_path, TRANSACTION_HEADER, &transaction_rows)?;
    info!(
        path = %transactions_path.display(),
        rows = transaction_rows.len(),
        duplicates = dirty.duplicates,
        missing_customer = dirty.missing_customer,
        non_numeric_amount = dirty.non_numeric_amount,
        "Transactions written"
    );

    let campaign_rows = generator.campaign_rows();
    let campaigns_path = paths.campaigns_path();
    write_csv(&campaigns_path, CAMPAIGN_HEADER, &campaign_rows)?;
    info!(
        path = %campaigns_path.display(),
        rows = campaign_rows.len(),
        campaigns = config.campaigns,
        "Campaigns written"
    );

    Ok(GenerationSummary {
        seed,
        start_date: generator.start_date(),
        end_date: generator.end_date(),
        transaction_rows: transaction_rows.len(),
        campaign_rows: campaign_rows.len(),
        dirty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_analytics::loader::load_table;
    use insights_analytics::schema::{campaign_schema, transaction_schema};
    use insights_analytics::validation::{validate_campaigns, validate_transactions};
    use insights_analytics::ExclusionReason;

    fn paths(dir: &Path) -> PathsConfig {
        PathsConfig {
            data_dir: dir.to_path_buf(),
            ..PathsConfig::default()
        }
    }

    fn config(dirty_row_rate: f64) -> GeneratorConfig {
        GeneratorConfig {
            seed: Some(42),
            customers: 40,
            transactions: 300,
            campaigns: 3,
            days: 90,
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            dirty_row_rate,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_generated_files_load_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        let summary = generate_datasets(&config(0.2), &paths, today()).unwrap();
        assert_eq!(summary.seed, 42);
        assert!(summary.dirty.total() > 0);

        let table = load_table(&paths.transactions_path(), &transaction_schema()).unwrap();
        assert_eq!(table.row_count(), summary.transaction_rows);
        let validated = validate_transactions(&table).unwrap();
        let ledger = &validated.ledger;
        assert_eq!(ledger.excluded_rows(), summary.dirty.total());
        assert_eq!(ledger.count(ExclusionReason::Duplicate), summary.dirty.duplicates);
        assert_eq!(
            ledger.count(ExclusionReason::MissingIdentifier),
            summary.dirty.missing_customer
        );
        assert_eq!(
            ledger.count(ExclusionReason::InvalidNumber),
            summary.dirty.non_numeric_amount
        );

        let table = load_table(&paths.campaigns_path(), &campaign_schema()).unwrap();
        let validated = validate_campaigns(&table).unwrap();
        assert_eq!(validated.ledger.excluded_rows(), 0);
        assert_eq!(validated.records.len(), summary.campaign_rows);
    }

    #[test]
    fn test_rerun_with_seed_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        generate_datasets(&config(0.05), &paths, today()).unwrap();
        let first = fs::read(paths.transactions_path()).unwrap();
        let first_campaigns = fs::read(paths.campaigns_path()).unwrap();

        generate_datasets(&config(0.05), &paths, today()).unwrap();
        assert_eq!(first, fs::read(paths.transactions_path()).unwrap());
        assert_eq!(first_campaigns, fs::read(paths.campaigns_path()).unwrap());
    }

    #[test]
    fn test_header_matches_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&path, TRANSACTION_HEADER, &[]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Transaction ID,Customer ID,Order Date,Order Amount,Category,Signup Date\n"
        );
    }
}
