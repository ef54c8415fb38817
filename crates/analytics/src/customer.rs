//! Customer metrics — retention/churn over two date windows, purchase
//! frequency, order value, and spend segmentation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use insights_core::config::{RetentionConfig, SegmentationConfig};
use insights_core::types::{mean, ratio, MetricReport, MetricValue, TransactionRecord};
use insights_segmentation::{SpendSegmentation, SpendSegmenter};
use serde::Serialize;
use tracing::info;

use crate::validation::ExclusionLedger;

/// Per-customer aggregate over all of their valid transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub orders: usize,
    pub total_spend: f64,
    pub first_order: NaiveDate,
    pub last_order: NaiveDate,
}

impl CustomerSummary {
    pub fn average_order_value(&self) -> f64 {
        self.total_spend / self.orders as f64
    }
}

/// Group transactions by customer, ordered by customer id.
pub fn summarize_customers(records: &[TransactionRecord]) -> BTreeMap<&str, CustomerSummary> {
    let mut summaries: BTreeMap<&str, CustomerSummary> = BTreeMap::new();
    for r in records {
        summaries
            .entry(r.customer_id.as_str())
            .and_modify(|s| {
                s.orders += 1;
                s.total_spend += r.amount;
                s.first_order = s.first_order.min(r.order_date);
                s.last_order = s.last_order.max(r.order_date);
            })
            .or_insert(CustomerSummary {
                orders: 1,
                total_spend: r.amount,
                first_order: r.order_date,
                last_order: r.order_date,
            });
    }
    summaries
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionResult {
    /// First day of the later window; `None` when there were no orders.
    pub split_date: Option<NaiveDate>,
    pub earlier_customers: usize,
    pub later_customers: usize,
    pub retained_customers: usize,
    /// `None` when the earlier window has no customers.
    pub retention_rate: Option<f64>,
    pub churn_rate: Option<f64>,
}

/// Midpoint of the observed order-date range, rounded down to whole days.
pub fn midpoint_split(records: &[TransactionRecord]) -> Option<NaiveDate> {
    let min = records.iter().map(|r| r.order_date).min()?;
    let max = records.iter().map(|r| r.order_date).max()?;
    Some(min + Duration::days((max - min).num_days() / 2))
}

/// Retention across two windows: earlier is `order_date < split`, later is
/// `order_date >= split`. A customer is retained when present in both.
pub fn retention(records: &[TransactionRecord], split: NaiveDate) -> RetentionResult {
    let mut earlier: BTreeSet<&str> = BTreeSet::new();
    let mut later: BTreeSet<&str> = BTreeSet::new();
    for r in records {
        if r.order_date < split {
            earlier.insert(r.customer_id.as_str());
        } else {
            later.insert(r.customer_id.as_str());
        }
    }
    let retained = earlier.intersection(&later).count();
    let retention_rate = ratio(retained as f64, earlier.len() as f64);

    RetentionResult {
        split_date: Some(split),
        earlier_customers: earlier.len(),
        later_customers: later.len(),
        retained_customers: retained,
        retention_rate,
        churn_rate: retention_rate.map(|r| 1.0 - r),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerMetrics {
    pub active_customers: usize,
    pub total_orders: usize,
    pub total_revenue: f64,
    /// Orders per customer, averaged across customers.
    pub purchase_frequency: Option<f64>,
    /// Each customer's mean order amount, averaged across customers.
    pub average_order_value: Option<f64>,
    pub retention: RetentionResult,
    /// Share of customers with more than one order.
    pub repeat_customer_rate: Option<f64>,
    /// Share of customers whose last order is more than `inactivity_days`
    /// before the latest order in the dataset.
    pub inactive_customer_rate: Option<f64>,
    pub inactivity_days: i64,
    pub segmentation: SpendSegmentation,
}

pub fn compute_customer_metrics(
    records: &[TransactionRecord],
    retention_config: &RetentionConfig,
    segmentation_config: &SegmentationConfig,
) -> CustomerMetrics {
    let summaries = summarize_customers(records);
    let active = summaries.len();

    let orders_per_customer: Vec<f64> = summaries.values().map(|s| s.orders as f64).collect();
    let aov_per_customer: Vec<f64> = summaries
        .values()
        .map(CustomerSummary::average_order_value)
        .collect();
    let spend_per_customer: Vec<f64> = summaries.values().map(|s| s.total_spend).collect();

    let windows = match retention_config.split_date.or_else(|| midpoint_split(records)) {
        Some(split) => retention(records, split),
        None => RetentionResult {
            split_date: None,
            earlier_customers: 0,
            later_customers: 0,
            retained_customers: 0,
            retention_rate: None,
            churn_rate: None,
        },
    };

    let repeat = summaries.values().filter(|s| s.orders > 1).count();
    let inactive = match records.iter().map(|r| r.order_date).max() {
        Some(latest) => summaries
            .values()
            .filter(|s| (latest - s.last_order).num_days() > retention_config.inactivity_days)
            .count(),
        None => 0,
    };

    let segmentation = SpendSegmenter::new(
        segmentation_config.medium_quantile,
        segmentation_config.high_quantile,
    )
    .segment(&spend_per_customer);

    let metrics = CustomerMetrics {
        active_customers: active,
        total_orders: records.len(),
        total_revenue: records.iter().map(|r| r.amount).sum(),
        purchase_frequency: mean(&orders_per_customer),
        average_order_value: mean(&aov_per_customer),
        retention: windows,
        repeat_customer_rate: ratio(repeat as f64, active as f64),
        inactive_customer_rate: ratio(inactive as f64, active as f64),
        inactivity_days: retention_config.inactivity_days,
        segmentation,
    };

    info!(
        active_customers = metrics.active_customers,
        retention_rate = ?metrics.retention.retention_rate,
        churn_rate = ?metrics.retention.churn_rate,
        "Computed customer metrics"
    );
    metrics
}

impl CustomerMetrics {
    pub fn to_report(&self, ledger: &ExclusionLedger) -> MetricReport {
        let mut report = MetricReport::new();
        report.insert("active_customers", self.active_customers);
        report.insert("total_orders", self.total_orders);
        report.insert("total_revenue", self.total_revenue);
        report.insert("purchase_frequency", self.purchase_frequency);
        report.insert("average_order_value", self.average_order_value);
        report.insert("retention_rate", self.retention.retention_rate);
        report.insert("churn_rate", self.retention.churn_rate);
        report.insert(
            "retention_window",
            MetricValue::record([
                (
                    "split_date",
                    MetricValue::from(self.retention.split_date.map(|d| d.to_string())),
                ),
                (
                    "earlier_customers",
                    MetricValue::from(self.retention.earlier_customers),
                ),
                ("later_customers", MetricValue::from(self.retention.later_customers)),
                (
                    "retained_customers",
                    MetricValue::from(self.retention.retained_customers),
                ),
            ]),
        );
        report.insert("repeat_customer_rate", self.repeat_customer_rate);
        report.insert("inactive_customer_rate", self.inactive_customer_rate);
        report.insert("inactivity_days", self.inactivity_days as f64);
        report.insert("segmentation", self.segmentation.to_metric());
        ledger.write_into(&mut report);
        report
    }
}
