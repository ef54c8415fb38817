use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One validated row of the customer transaction file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub customer_id: String,
    pub order_date: NaiveDate,
    pub amount: f64,
    pub category: Option<String>,
    pub signup_date: Option<NaiveDate>,
}

/// One validated campaign-day row of the marketing campaign file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub campaign_id: String,
    pub date: NaiveDate,
    pub channel: String,
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub revenue: f64,
}

/// `numerator / denominator`, or `None` when the denominator is zero.
///
/// Undefined rates stay undefined: they are never replaced by zero.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return None;
    }
    Some(numerator / denominator)
}

/// Mean of `values`, `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    ratio(values.iter().sum(), values.len() as f64)
}

/// A computed metric. `Number(None)` is an undefined metric and serializes as
/// JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(Option<f64>),
    Text(String),
    Record(BTreeMap<String, MetricValue>),
    List(Vec<MetricValue>),
}

impl MetricValue {
    pub const UNDEFINED: MetricValue = MetricValue::Number(None);

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => *v,
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Number(None))
    }

    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, MetricValue)>,
    {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        Self::Number(v.is_finite().then_some(v))
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(v: Option<f64>) -> Self {
        Self::Number(v.filter(|x| x.is_finite()))
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        Self::Number(Some(v as f64))
    }
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        Self::Number(Some(v as f64))
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Option<String>> for MetricValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(Self::UNDEFINED, Self::Text)
    }
}

impl<T: Into<MetricValue>> From<Vec<T>> for MetricValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Name → value mapping written as the metrics file. Keys are kept sorted so
/// identical metrics always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricReport {
    metrics: BTreeMap<String, MetricValue>,
}

impl MetricReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) {
        self.metrics.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetricValue)> {
        self.metrics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_zero_denominator_is_undefined() {
        assert_eq!(ratio(5.0, 0.0), None);
        assert_eq!(ratio(0.0, 0.0), None);
        assert_eq!(ratio(1.0, 4.0), Some(0.25));
    }

    #[test]
    fn test_mean_of_empty_is_undefined() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_non_finite_numbers_become_null() {
        assert!(MetricValue::from(f64::NAN).is_undefined());
        assert!(MetricValue::from(Some(f64::INFINITY)).is_undefined());
        assert_eq!(MetricValue::from(0.5).as_number(), Some(0.5));
    }

    #[test]
    fn test_report_serializes_sorted_with_nulls() {
        let mut report = MetricReport::new();
        report.insert("roi", MetricValue::UNDEFINED);
        report.insert("active_customers", 3usize);
        report.insert("top_campaign", "CMP-001");

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"active_customers":3.0,"roi":null,"top_campaign":"CMP-001"}"#
        );
    }

    #[test]
    fn test_record_value_nests() {
        let value = MetricValue::record([("count", MetricValue::from(2usize))]);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"count":2.0}"#);
    }
}
