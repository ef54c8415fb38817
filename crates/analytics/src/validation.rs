//! Row validation: turns a loaded table into typed records and accounts for
//! every row that had to be left out.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use insights_core::error::{InsightsError, InsightsResult};
use insights_core::table::Table;
use insights_core::types::{CampaignRecord, MetricReport, MetricValue, TransactionRecord};
use serde::Serialize;
use tracing::warn;

use crate::schema::{campaigns, transactions};

/// How many individual warnings are kept for logging.
const MAX_SAMPLED_WARNINGS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    MissingIdentifier,
    InvalidNumber,
    InvalidDate,
    Duplicate,
}

impl ExclusionReason {
    pub const ALL: [ExclusionReason; 4] = [
        Self::MissingIdentifier,
        Self::InvalidNumber,
        Self::InvalidDate,
        Self::Duplicate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingIdentifier => "missing_identifier",
            Self::InvalidNumber => "invalid_number",
            Self::InvalidDate => "invalid_date",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row excluded from aggregation. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputationWarning {
    /// 1-based data row (the header is not counted).
    pub row: usize,
    pub reason: ExclusionReason,
    pub detail: String,
}

/// Running tally of valid and excluded rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionLedger {
    valid_rows: usize,
    counts: BTreeMap<ExclusionReason, usize>,
    samples: Vec<ComputationWarning>,
}

impl ExclusionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_valid(&mut self) {
        self.valid_rows += 1;
    }

    pub fn exclude(&mut self, warning: ComputationWarning) {
        *self.counts.entry(warning.reason).or_insert(0) += 1;
        if self.samples.len() < MAX_SAMPLED_WARNINGS {
            self.samples.push(warning);
        }
    }

    pub fn valid_rows(&self) -> usize {
        self.valid_rows
    }

    pub fn excluded_rows(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn total_rows(&self) -> usize {
        self.valid_rows + self.excluded_rows()
    }

    pub fn count(&self, reason: ExclusionReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn samples(&self) -> &[ComputationWarning] {
        &self.samples
    }

    /// Log the sampled warnings and a one-line summary.
    pub fn log_summary(&self, dataset: &str) {
        for w in &self.samples {
            warn!(dataset, row = w.row, reason = %w.reason, detail = %w.detail, "Row excluded");
        }
        let excluded = self.excluded_rows();
        if excluded > self.samples.len() {
            warn!(
                dataset,
                suppressed = excluded - self.samples.len(),
                "Further excluded rows not logged individually"
            );
        }
        if excluded > 0 {
            warn!(
                dataset,
                total_rows = self.total_rows(),
                valid_rows = self.valid_rows,
                excluded_rows = excluded,
                "Excluded malformed rows from aggregation"
            );
        }
    }

    /// Add row accounting to a metric report.
    pub fn write_into(&self, report: &mut MetricReport) {
        report.insert("total_rows", self.total_rows());
        report.insert("valid_rows", self.valid_rows);
        report.insert("excluded_rows", self.excluded_rows());
        report.insert(
            "exclusions",
            MetricValue::record(
                ExclusionReason::ALL
                    .iter()
                    .map(|r| (r.as_str(), MetricValue::from(self.count(*r)))),
            ),
        );
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedRows<T> {
    pub records: Vec<T>,
    pub ledger: ExclusionLedger,
}

fn require<'a, T>(column: Option<&'a [T]>, name: &str) -> InsightsResult<&'a [T]> {
    column.ok_or_else(|| InsightsError::MissingColumn(name.to_string()))
}

fn warning(row: usize, reason: ExclusionReason, detail: impl Into<String>) -> ComputationWarning {
    ComputationWarning {
        row: row + 1,
        reason,
        detail: detail.into(),
    }
}

/// Validate transaction rows. A repeated transaction id keeps its first
/// valid occurrence.
pub fn validate_transactions(table: &Table) -> InsightsResult<ValidatedRows<TransactionRecord>> {
    use transactions::*;

    let ids = require(table.text(TRANSACTION_ID), TRANSACTION_ID)?;
    let customers = require(table.text(CUSTOMER_ID), CUSTOMER_ID)?;
    let dates = require(table.date(ORDER_DATE), ORDER_DATE)?;
    let amounts = require(table.float(ORDER_AMOUNT), ORDER_AMOUNT)?;
    let categories = table.text(CATEGORY);
    let signups = table.date(SIGNUP_DATE);

    let mut ledger = ExclusionLedger::new();
    let mut records = Vec::with_capacity(table.row_count());
    let mut seen: HashSet<&str> = HashSet::new();

    for row in 0..table.row_count() {
        let (Some(id), Some(customer)) = (&ids[row], &customers[row]) else {
            ledger.exclude(warning(
                row,
                ExclusionReason::MissingIdentifier,
                "transaction or customer id is empty",
            ));
            continue;
        };
        let Some(amount) = amounts[row].filter(|a| *a > 0.0) else {
            ledger.exclude(warning(
                row,
                ExclusionReason::InvalidNumber,
                format!("order amount for {id} is missing, non-numeric, or not positive"),
            ));
            continue;
        };
        let Some(order_date) = dates[row] else {
            ledger.exclude(warning(
                row,
                ExclusionReason::InvalidDate,
                format!("order date for {id} is missing or unparseable"),
            ));
            continue;
        };
        if !seen.insert(id.as_str()) {
            ledger.exclude(warning(
                row,
                ExclusionReason::Duplicate,
                format!("transaction {id} already seen"),
            ));
            continue;
        }

        ledger.record_valid();
        records.push(TransactionRecord {
            transaction_id: id.clone(),
            customer_id: customer.clone(),
            order_date,
            amount,
            category: categories.and_then(|c| c[row].clone()),
            signup_date: signups.and_then(|s| s[row]),
        });
    }

    Ok(ValidatedRows { records, ledger })
}

/// Validate campaign-day rows. A missing channel becomes `"unknown"`.
pub fn validate_campaigns(table: &Table) -> InsightsResult<ValidatedRows<CampaignRecord>> {
    use campaigns::*;

    let ids = require(table.text(CAMPAIGN_ID), CAMPAIGN_ID)?;
    let dates = require(table.date(DATE), DATE)?;
    let channels = require(table.text(CHANNEL), CHANNEL)?;
    let spend = require(table.float(SPEND), SPEND)?;
    let impressions = require(table.integer(IMPRESSIONS), IMPRESSIONS)?;
    let clicks = require(table.integer(CLICKS), CLICKS)?;
    let conversions = require(table.integer(CONVERSIONS), CONVERSIONS)?;
    let revenue = require(table.float(REVENUE), REVENUE)?;

    let mut ledger = ExclusionLedger::new();
    let mut records = Vec::with_capacity(table.row_count());

    let non_negative = |v: Option<f64>| v.filter(|x| *x >= 0.0);
    let count = |v: Option<i64>| v.and_then(|x| u64::try_from(x).ok());

    for row in 0..table.row_count() {
        let Some(id) = &ids[row] else {
            ledger.exclude(warning(
                row,
                ExclusionReason::MissingIdentifier,
                "campaign id is empty",
            ));
            continue;
        };
        let numbers = (
            non_negative(spend[row]),
            non_negative(revenue[row]),
            count(impressions[row]),
            count(clicks[row]),
            count(conversions[row]),
        );
        let (Some(spend), Some(revenue), Some(impressions), Some(clicks), Some(conversions)) =
            numbers
        else {
            ledger.exclude(warning(
                row,
                ExclusionReason::InvalidNumber,
                format!("campaign {id} has a missing, non-numeric, or negative figure"),
            ));
            continue;
        };
        let Some(date) = dates[row] else {
            ledger.exclude(warning(
                row,
                ExclusionReason::InvalidDate,
                format!("date for campaign {id} is missing or unparseable"),
            ));
            continue;
        };

        ledger.record_valid();
        records.push(CampaignRecord {
            campaign_id: id.clone(),
            date,
            channel: channels[row].clone().unwrap_or_else(|| "unknown".to_string()),
            spend,
            impressions,
            clicks,
            conversions,
            revenue,
        });
    }

    Ok(ValidatedRows { records, ledger })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_table;
    use crate::schema::{campaign_schema, transaction_schema};
    use proptest::prelude::*;
    use std::path::Path;

    fn transactions_table(csv: &str) -> Table {
        read_table(csv.as_bytes(), Path::new("test.csv"), &transaction_schema()).unwrap()
    }

    #[test]
    fn test_malformed_transactions_are_counted() {
        let table = transactions_table(
            "Transaction ID,Customer ID,Order Date,Order Amount,Category\n\
             T1,C1,2024-01-01,10,Books\n\
             T2,,2024-01-01,10,Books\n\
             T3,C2,2024-01-01,ten,Books\n\
             T4,C2,not-a-date,5,Books\n\
             T5,C3,2024-01-02,-4,Toys\n\
             T1,C1,2024-01-01,10,Books\n\
             T6,C3,2024-01-03,7,\n",
        );
        let validated = validate_transactions(&table).unwrap();
        let ledger = &validated.ledger;

        assert_eq!(validated.records.len(), 2);
        assert_eq!(ledger.valid_rows(), 2);
        assert_eq!(ledger.count(ExclusionReason::MissingIdentifier), 1);
        assert_eq!(ledger.count(ExclusionReason::InvalidNumber), 2);
        assert_eq!(ledger.count(ExclusionReason::InvalidDate), 1);
        assert_eq!(ledger.count(ExclusionReason::Duplicate), 1);
        assert_eq!(ledger.total_rows(), table.row_count());
        assert_eq!(validated.records[1].category, None);
        assert_eq!(ledger.samples()[0].row, 2);
    }

    #[test]
    fn test_campaign_rows_validated() {
        let table = read_table(
            "Campaign ID,Date,Channel,Spend,Impressions,Clicks,Conversions,Revenue\n\
             CMP-1,2024-01-01,Email,100,1000,50,5,300\n\
             CMP-1,2024-01-02,,0,0,0,0,0\n\
             CMP-2,2024-01-01,Social,-1,10,1,0,0\n\
             ,2024-01-01,Social,1,10,1,0,0\n\
             CMP-3,2024-01-01,Search,1,10.5,1,0,0\n"
                .as_bytes(),
            Path::new("campaigns.csv"),
            &campaign_schema(),
        )
        .unwrap();
        let validated = validate_campaigns(&table).unwrap();

        assert_eq!(validated.records.len(), 2);
        assert_eq!(validated.records[1].channel, "unknown");
        assert_eq!(validated.ledger.count(ExclusionReason::InvalidNumber), 2);
        assert_eq!(validated.ledger.count(ExclusionReason::MissingIdentifier), 1);
        assert_eq!(validated.ledger.total_rows(), 5);
    }

    #[test]
    fn test_ledger_writes_row_accounting() {
        let mut ledger = ExclusionLedger::new();
        ledger.record_valid();
        ledger.exclude(warning(0, ExclusionReason::Duplicate, "dup"));

        let mut report = MetricReport::new();
        ledger.write_into(&mut report);
        assert_eq!(report.get("total_rows").unwrap().as_number(), Some(2.0));
        assert_eq!(report.get("excluded_rows").unwrap().as_number(), Some(1.0));
        let json = serde_json::to_string(report.get("exclusions").unwrap()).unwrap();
        assert!(json.contains(r#""duplicate":1.0"#));
        assert!(json.contains(r#""invalid_date":0.0"#));
    }

    #[test]
    fn test_table_without_required_column_is_rejected() {
        let table = Table::new(Vec::new()).unwrap();
        assert!(matches!(
            validate_transactions(&table),
            Err(InsightsError::MissingColumn(_))
        ));
    }

    fn cell() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[A-C][0-9]",
            "-?[0-9]{1,3}(\\.[0-9])?",
            Just("2024-05-01".to_string()),
            Just("garbage".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn prop_valid_plus_excluded_equals_total(
            rows in proptest::collection::vec((cell(), cell(), cell(), cell()), 0..40)
        ) {
            let mut csv = String::from("Transaction ID,Customer ID,Order Date,Order Amount\n");
            for (a, b, c, d) in &rows {
                csv.push_str(&format!("{a},{b},{c},{d}\n"));
            }
            let table = transactions_table(&csv);
            let validated = validate_transactions(&table).unwrap();
            prop_assert_eq!(validated.ledger.total_rows(), rows.len());
            prop_assert_eq!(validated.records.len(), validated.ledger.valid_rows());
        }
    }
}
