//! Campaign metrics — CTR, conversion rate, ROI, cost per conversion, the ROI
//! ranking, and a per-channel breakdown.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use insights_core::types::{ratio, CampaignRecord, MetricReport, MetricValue};
use serde::Serialize;
use tracing::info;

use crate::validation::ExclusionLedger;

/// Summed campaign figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CampaignTotals {
    pub spend: f64,
    pub revenue: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

impl CampaignTotals {
    pub fn add(&mut self, record: &CampaignRecord) {
        self.spend += record.spend;
        self.revenue += record.revenue;
        self.impressions += record.impressions;
        self.clicks += record.clicks;
        self.conversions += record.conversions;
    }

    /// clicks / impressions; undefined with no impressions.
    pub fn ctr(&self) -> Option<f64> {
        ratio(self.clicks as f64, self.impressions as f64)
    }

    /// conversions / clicks; undefined with no clicks.
    pub fn conversion_rate(&self) -> Option<f64> {
        ratio(self.conversions as f64, self.clicks as f64)
    }

    /// (revenue − spend) / spend; undefined with no spend.
    pub fn roi(&self) -> Option<f64> {
        ratio(self.revenue - self.spend, self.spend)
    }

    /// spend / conversions; undefined with no conversions.
    pub fn cost_per_conversion(&self) -> Option<f64> {
        ratio(self.spend, self.conversions as f64)
    }

    pub fn rates(&self) -> Rates {
        Rates {
            ctr: self.ctr(),
            conversion_rate: self.conversion_rate(),
            roi: self.roi(),
            cost_per_conversion: self.cost_per_conversion(),
        }
    }

    fn metric_fields(&self) -> Vec<(&'static str, MetricValue)> {
        let rates = self.rates();
        vec![
            ("spend", self.spend.into()),
            ("revenue", self.revenue.into()),
            ("impressions", self.impressions.into()),
            ("clicks", self.clicks.into()),
            ("conversions", self.conversions.into()),
            ("ctr", rates.ctr.into()),
            ("conversion_rate", rates.conversion_rate.into()),
            ("roi", rates.roi.into()),
            ("cost_per_conversion", rates.cost_per_conversion.into()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rates {
    pub ctr: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub roi: Option<f64>,
    pub cost_per_conversion: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignPerformance {
    pub campaign_id: String,
    pub channel: String,
    pub totals: CampaignTotals,
    pub rates: Rates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPerformance {
    pub channel: String,
    pub campaigns: usize,
    pub totals: CampaignTotals,
    pub rates: Rates,
}

/// Aggregate campaign-day rows per campaign, ordered by campaign id. A
/// campaign's channel is taken from its first row.
pub fn aggregate_campaigns(records: &[CampaignRecord]) -> Vec<CampaignPerformance> {
    let mut by_id: BTreeMap<&str, (&str, CampaignTotals)> = BTreeMap::new();
    for r in records {
        by_id
            .entry(r.campaign_id.as_str())
            .or_insert_with(|| (r.channel.as_str(), CampaignTotals::default()))
            .1
            .add(r);
    }
    by_id
        .into_iter()
        .map(|(id, (channel, totals))| CampaignPerformance {
            campaign_id: id.to_string(),
            channel: channel.to_string(),
            totals,
            rates: totals.rates(),
        })
        .collect()
}

/// Aggregate rows per channel, ordered by channel name.
pub fn channel_breakdown(records: &[CampaignRecord]) -> Vec<ChannelPerformance> {
    let mut by_channel: BTreeMap<&str, (BTreeSet<&str>, CampaignTotals)> = BTreeMap::new();
    for r in records {
        let entry = by_channel.entry(r.channel.as_str()).or_default();
        entry.0.insert(r.campaign_id.as_str());
        entry.1.add(r);
    }
    by_channel
        .into_iter()
        .map(|(channel, (campaigns, totals))| ChannelPerformance {
            channel: channel.to_string(),
            campaigns: campaigns.len(),
            totals,
            rates: totals.rates(),
        })
        .collect()
}

/// Ranking order: ROI descending, undefined ROI after every defined one,
/// then spend descending, then campaign id ascending.
pub fn compare_by_roi(a: &CampaignPerformance, b: &CampaignPerformance) -> Ordering {
    let by_roi = match (a.rates.roi, b.rates.roi) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_roi
        .then_with(|| b.totals.spend.total_cmp(&a.totals.spend))
        .then_with(|| a.campaign_id.cmp(&b.campaign_id))
}

pub fn rank_by_roi(mut campaigns: Vec<CampaignPerformance>) -> Vec<CampaignPerformance> {
    campaigns.sort_by(compare_by_roi);
    campaigns
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignMetrics {
    pub overall: CampaignTotals,
    pub overall_rates: Rates,
    /// Every campaign, best ROI first.
    pub ranking: Vec<CampaignPerformance>,
    pub channels: Vec<ChannelPerformance>,
}

impl CampaignMetrics {
    /// Highest-ranked campaign with a defined ROI.
    pub fn top_campaign(&self) -> Option<&CampaignPerformance> {
        self.ranking.iter().find(|c| c.rates.roi.is_some())
    }

    /// Lowest-ranked campaign with a defined ROI.
    pub fn bottom_campaign(&self) -> Option<&CampaignPerformance> {
        self.ranking.iter().rev().find(|c| c.rates.roi.is_some())
    }

    pub fn to_report(&self, ledger: &ExclusionLedger) -> MetricReport {
        let mut report = MetricReport::new();
        report.insert("campaigns", self.ranking.len());
        for (name, value) in self.overall.metric_fields() {
            let key = match name {
                "ctr" | "conversion_rate" | "roi" | "cost_per_conversion" => name.to_string(),
                other => format!("total_{other}"),
            };
            report.insert(key, value);
        }

        let top = self.top_campaign();
        let bottom = self.bottom_campaign();
        report.insert("top_campaign", top.map(|c| c.campaign_id.clone()));
        report.insert("top_campaign_roi", top.and_then(|c| c.rates.roi));
        report.insert("bottom_campaign", bottom.map(|c| c.campaign_id.clone()));
        report.insert("bottom_campaign_roi", bottom.and_then(|c| c.rates.roi));

        let ranking: Vec<MetricValue> = self
            .ranking
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut fields = vec![
                    ("rank", MetricValue::from(i + 1)),
                    ("campaign_id", MetricValue::from(c.campaign_id.as_str())),
                    ("channel", MetricValue::from(c.channel.as_str())),
                ];
                fields.extend(c.totals.metric_fields());
                MetricValue::record(fields)
            })
            .collect();
        report.insert("ranking", MetricValue::List(ranking));

        report.insert(
            "channels",
            MetricValue::record(self.channels.iter().map(|ch| {
                let mut fields = vec![("campaigns", MetricValue::from(ch.campaigns))];
                fields.extend(ch.totals.metric_fields());
                (ch.channel.clone(), MetricValue::record(fields))
            })),
        );

        ledger.write_into(&mut report);
        report
    }
}

pub fn compute_campaign_metrics(records: &[CampaignRecord]) -> CampaignMetrics {
    let mut overall = CampaignTotals::default();
    for r in records {
        overall.add(r);
    }

    let metrics = CampaignMetrics {
        overall,
        overall_rates: overall.rates(),
        ranking: rank_by_roi(aggregate_campaigns(records)),
        channels: channel_breakdown(records),
    };

    if let Some(top) = metrics.top_campaign() {
        info!(campaign_id = %top.campaign_id, roi = ?top.rates.roi, "Top campaign");
    }
    if let Some(bottom) = metrics.bottom_campaign() {
        info!(campaign_id = %bottom.campaign_id, roi = ?bottom.rates.roi, "Bottom campaign");
    }
    info!(
        campaigns = metrics.ranking.len(),
        ctr = ?metrics.overall_rates.ctr,
        conversion_rate = ?metrics.overall_rates.conversion_rate,
        roi = ?metrics.overall_rates.roi,
        "Computed campaign metrics"
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn row(
        id: &str,
        channel: &str,
        spend: f64,
        impressions: u64,
        clicks: u64,
        conversions: u64,
        revenue: f64,
    ) -> CampaignRecord {
        CampaignRecord {
            campaign_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            channel: channel.to_string(),
            spend,
            impressions,
            clicks,
            conversions,
            revenue,
        }
    }

    #[test]
    fn test_rates_on_aggregated_rows() {
        let records = vec![
            row("CMP-1", "Email", 100.0, 1000, 50, 5, 250.0),
            row("CMP-1", "Email", 100.0, 1000, 30, 3, 150.0),
        ];
        let campaigns = aggregate_campaigns(&records);
        assert_eq!(campaigns.len(), 1);
        let c = &campaigns[0];
        assert_eq!(c.totals.impressions, 2000);
        assert_eq!(c.rates.ctr, Some(0.04));
        assert_eq!(c.rates.conversion_rate, Some(0.1));
        assert_eq!(c.rates.roi, Some(1.0));
        assert_eq!(c.rates.cost_per_conversion, Some(25.0));
    }

    #[test]
    fn test_all_zero_campaign_reports_nulls_and_is_kept() {
        let records = vec![
            row("CMP-1", "Email", 100.0, 1000, 10, 1, 150.0),
            row("CMP-0", "Social", 0.0, 0, 0, 0, 0.0),
        ];
        let metrics = compute_campaign_metrics(&records);
        assert_eq!(metrics.ranking.len(), 2);

        let zero = metrics
            .ranking
            .iter()
            .find(|c| c.campaign_id == "CMP-0")
            .unwrap();
        assert_eq!(zero.rates.ctr, None);
        assert_eq!(zero.rates.conversion_rate, None);
        assert_eq!(zero.rates.roi, None);
        // Undefined ROI ranks last.
        assert_eq!(metrics.ranking[1].campaign_id, "CMP-0");

        let report = metrics.to_report(&ExclusionLedger::new());
        let json = serde_json::to_string(report.get("ranking").unwrap()).unwrap();
        assert!(json.contains(r#""campaign_id":"CMP-0""#));
        assert!(json.contains(r#""roi":null"#));
    }

    #[test]
    fn test_equal_roi_ranks_larger_spend_first() {
        let records = vec![
            row("SMALL", "Email", 100.0, 10, 1, 1, 200.0),
            row("LARGE", "Email", 1000.0, 10, 1, 1, 2000.0),
            row("BEST", "Search", 10.0, 10, 1, 1, 100.0),
        ];
        let metrics = compute_campaign_metrics(&records);
        let order: Vec<&str> = metrics
            .ranking
            .iter()
            .map(|c| c.campaign_id.as_str())
            .collect();
        assert_eq!(order, vec!["BEST", "LARGE", "SMALL"]);
        assert_eq!(metrics.top_campaign().unwrap().campaign_id, "BEST");
        assert_eq!(metrics.bottom_campaign().unwrap().campaign_id, "SMALL");
    }

    #[test]
    fn test_no_defined_roi_has_no_top_campaign() {
        let metrics = compute_campaign_metrics(&[row("Z", "Email", 0.0, 0, 0, 0, 0.0)]);
        assert!(metrics.top_campaign().is_none());
        let report = metrics.to_report(&ExclusionLedger::new());
        assert!(report.get("top_campaign").unwrap().is_undefined());
        assert!(report.get("roi").unwrap().is_undefined());
    }

    #[test]
    fn test_channel_breakdown_counts_campaigns() {
        let records = vec![
            row("A", "Email", 10.0, 100, 10, 1, 20.0),
            row("A", "Email", 10.0, 100, 10, 1, 20.0),
            row("B", "Email", 10.0, 100, 0, 0, 0.0),
            row("C", "Social", 5.0, 0, 0, 0, 5.0),
        ];
        let channels = channel_breakdown(&records);
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].channel, "Email");
        assert_eq!(channels[0].campaigns, 2);
        assert_eq!(channels[0].totals.spend, 30.0);
        assert_eq!(channels[1].rates.ctr, None);
        assert_eq!(channels[1].rates.roi, Some(0.0));
    }

    #[test]
    fn test_rates_are_reproducible() {
        let records = vec![
            row("A", "Email", 33.3, 7777, 123, 7, 91.1),
            row("B", "Search", 12.7, 1234, 77, 3, 4.2),
        ];
        let first = compute_campaign_metrics(&records);
        let second = compute_campaign_metrics(&records);
        for (a, b) in first.ranking.iter().zip(second.ranking.iter()) {
            assert_eq!(a.rates.ctr.map(f64::to_bits), b.rates.ctr.map(f64::to_bits));
            assert_eq!(a.rates.roi.map(f64::to_bits), b.rates.roi.map(f64::to_bits));
            assert_eq!(
                a.rates.conversion_rate.map(f64::to_bits),
                b.rates.conversion_rate.map(f64::to_bits)
            );
        }
    }

    fn campaign_strategy() -> impl Strategy<Value = CampaignRecord> {
        (0u8..20, 0u8..4, 0u8..3).prop_map(|(id, spend, revenue)| {
            row(
                &format!("C{id:02}"),
                "Email",
                spend as f64 * 50.0,
                100,
                10,
                1,
                revenue as f64 * 100.0,
            )
        })
    }

    proptest! {
        #[test]
        fn prop_ranking_is_roi_then_spend_descending(
            records in proptest::collection::vec(campaign_strategy(), 0..30)
        ) {
            let ranking = compute_campaign_metrics(&records).ranking;
            for pair in ranking.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                match (a.rates.roi, b.rates.roi) {
                    (Some(x), Some(y)) => {
                        prop_assert!(x >= y);
                        if x == y {
                            prop_assert!(a.totals.spend >= b.totals.spend);
                        }
                    }
                    (None, Some(_)) => prop_assert!(false, "undefined ROI ranked above a defined one"),
                    _ => {}
                }
                prop_assert_ne!(compare_by_roi(a, b), Ordering::Greater);
                prop_assert_ne!(compare_by_roi(a, b), Ordering::Equal);
            }
        }
    }
}
