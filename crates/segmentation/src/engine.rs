//! Spend-based customer segmentation into value tiers.

use insights_core::types::{mean, MetricValue};
use serde::Serialize;
use tracing::debug;

use crate::quantile::{quantile, sorted};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTier {
    High,
    Medium,
    Low,
}

impl ValueTier {
    pub const ALL: [ValueTier; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High Value",
            Self::Medium => "Medium Value",
            Self::Low => "Low Value",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    pub tier: ValueTier,
    pub customers: usize,
    pub total_spend: f64,
    /// `None` when the tier is empty.
    pub average_spend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendSegmentation {
    /// Lower bound (inclusive) of the high tier; `None` with no customers.
    pub high_cutoff: Option<f64>,
    /// Lower bound (inclusive) of the medium tier; `None` with no customers.
    pub medium_cutoff: Option<f64>,
    /// One entry per tier, ordered high → low.
    pub tiers: Vec<TierSummary>,
}

impl SpendSegmentation {
    pub fn tier(&self, tier: ValueTier) -> Option<&TierSummary> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    pub fn to_metric(&self) -> MetricValue {
        let mut fields: Vec<(&str, MetricValue)> = vec![
            ("high_cutoff", self.high_cutoff.into()),
            ("medium_cutoff", self.medium_cutoff.into()),
        ];
        for t in &self.tiers {
            fields.push((
                t.tier.as_str(),
                MetricValue::record([
                    ("customers", MetricValue::from(t.customers)),
                    ("total_spend", MetricValue::from(t.total_spend)),
                    ("average_spend", MetricValue::from(t.average_spend)),
                ]),
            ));
        }
        MetricValue::record(fields)
    }
}

/// Buckets customers by total spend. Tier lower bounds are inclusive:
/// `high` is spend ≥ q(high), `medium` is q(medium) ≤ spend < q(high), and
/// `low` is everything below q(medium).
#[derive(Debug, Clone)]
pub struct SpendSegmenter {
    high_quantile: f64,
    medium_quantile: f64,
}

impl SpendSegmenter {
    pub fn new(medium_quantile: f64, high_quantile: f64) -> Self {
        Self {
            high_quantile,
            medium_quantile,
        }
    }

    pub fn segment(&self, customer_spend: &[f64]) -> SpendSegmentation {
        let ordered = sorted(customer_spend);
        let high_cutoff = quantile(&ordered, self.high_quantile);
        let medium_cutoff = quantile(&ordered, self.medium_quantile);

        let mut buckets: [Vec<f64>; 3] = Default::default();
        for &spend in customer_spend {
            let idx = match classify(spend, high_cutoff, medium_cutoff) {
                ValueTier::High => 0,
                ValueTier::Medium => 1,
                ValueTier::Low => 2,
            };
            buckets[idx].push(spend);
        }

        let tiers = ValueTier::ALL
            .iter()
            .zip(buckets.iter())
            .map(|(tier, spends)| TierSummary {
                tier: *tier,
                customers: spends.len(),
                total_spend: spends.iter().sum(),
                average_spend: mean(spends),
            })
            .collect();

        debug!(
            customers = customer_spend.len(),
            ?high_cutoff,
            ?medium_cutoff,
            "Segmented customers by spend"
        );

        SpendSegmentation {
            high_cutoff,
            medium_cutoff,
            tiers,
        }
    }
}

fn classify(spend: f64, high: Option<f64>, medium: Option<f64>) -> ValueTier {
    match (high, medium) {
        (Some(h), _) if spend >= h => ValueTier::High,
        (_, Some(m)) if spend >= m => ValueTier::Medium,
        _ => ValueTier::Low,
    }
}
