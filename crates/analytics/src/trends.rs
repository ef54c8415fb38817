//! Time and category series derived from validated records. These feed the
//! charts; they are not part of the metrics file.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use insights_core::types::{ratio, CampaignRecord, TransactionRecord};
use serde::Serialize;

use crate::campaign::CampaignTotals;

const UNCATEGORIZED: &str = "Uncategorized";

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]`. The last bin is closed on the
/// right. Empty input gives no bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let bins = bins.max(1);
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);
    let (lo, hi) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerTrends {
    /// `YYYY-MM` → revenue, chronological.
    pub monthly_revenue: Vec<(String, f64)>,
    /// Category → revenue, highest first.
    pub category_revenue: Vec<(String, f64)>,
    /// Monday..Sunday → order count.
    pub orders_by_weekday: Vec<(String, usize)>,
    pub amount_histogram: Vec<HistogramBin>,
}

pub fn customer_trends(records: &[TransactionRecord], histogram_bins: usize) -> CustomerTrends {
    let mut monthly: BTreeMap<String, f64> = BTreeMap::new();
    let mut categories: BTreeMap<&str, f64> = BTreeMap::new();
    let mut weekdays = [0usize; 7];

    for r in records {
        *monthly.entry(month_key(r.order_date)).or_insert(0.0) += r.amount;
        *categories
            .entry(r.category.as_deref().unwrap_or(UNCATEGORIZED))
            .or_insert(0.0) += r.amount;
        weekdays[r.order_date.weekday().num_days_from_monday() as usize] += 1;
    }

    let mut category_revenue: Vec<(String, f64)> = categories
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    category_revenue.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();

    CustomerTrends {
        monthly_revenue: monthly.into_iter().collect(),
        category_revenue,
        orders_by_weekday: WEEKDAYS
            .iter()
            .zip(weekdays)
            .map(|(day, n)| (weekday_name(*day).to_string(), n))
            .collect(),
        amount_histogram: histogram(&amounts, histogram_bins),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendPoint {
    pub campaign_id: String,
    pub spend: f64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignTrends {
    pub monthly_impressions: Vec<(String, u64)>,
    pub monthly_ctr: Vec<(String, Option<f64>)>,
    /// One point per campaign-day with at least one click.
    pub conversion_vs_spend: Vec<SpendPoint>,
}

pub fn campaign_trends(records: &[CampaignRecord]) -> CampaignTrends {
    let mut monthly: BTreeMap<String, CampaignTotals> = BTreeMap::new();
    for r in records {
        monthly.entry(month_key(r.date)).or_default().add(r);
    }

    let conversion_vs_spend = records
        .iter()
        .filter_map(|r| {
            ratio(r.conversions as f64, r.clicks as f64).map(|rate| SpendPoint {
                campaign_id: r.campaign_id.clone(),
                spend: r.spend,
                conversion_rate: rate,
            })
        })
        .collect();

    CampaignTrends {
        monthly_impressions: monthly
            .iter()
            .map(|(m, t)| (m.clone(), t.impressions))
            .collect(),
        monthly_ctr: monthly.iter().map(|(m, t)| (m.clone(), t.ctr())).collect(),
        conversion_vs_spend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(order_date: NaiveDate, amount: f64, category: Option<&str>) -> TransactionRecord {
        TransactionRecord {
            transaction_id: format!("T-{order_date}-{amount}"),
            customer_id: "C1".to_string(),
            order_date,
            amount,
            category: category.map(str::to_string),
            signup_date: None,
        }
    }

    #[test]
    fn test_customer_trends() {
        let records = vec![
            // 2024-01-01 is a Monday.
            tx(date(2024, 1, 1), 10.0, Some("Books")),
            tx(date(2024, 1, 7), 30.0, Some("Toys")),
            tx(date(2024, 2, 5), 5.0, None),
        ];
        let trends = customer_trends(&records, 4);

        assert_eq!(
            trends.monthly_revenue,
            vec![("2024-01".to_string(), 40.0), ("2024-02".to_string(), 5.0)]
        );
        assert_eq!(trends.category_revenue[0], ("Toys".to_string(), 30.0));
        assert_eq!(trends.category_revenue[2], ("Uncategorized".to_string(), 5.0));
        assert_eq!(trends.orders_by_weekday[0], ("Monday".to_string(), 2));
        assert_eq!(trends.orders_by_weekday[6], ("Sunday".to_string(), 1));
        assert_eq!(trends.orders_by_weekday.len(), 7);
        assert_eq!(trends.amount_histogram.len(), 4);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        // The maximum lands in the last bin.
        assert_eq!(bins[1].count, 3);
        assert!(histogram(&[], 10).is_empty());

        let flat = histogram(&[5.0, 5.0], 3);
        assert_eq!(flat.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_campaign_trends_skip_zero_click_points() {
        let row = |d: NaiveDate, impressions: u64, clicks: u64, conversions: u64| CampaignRecord {
            campaign_id: "A".to_string(),
            date: d,
            channel: "Email".to_string(),
            spend: 10.0,
            impressions,
            clicks,
            conversions,
            revenue: 20.0,
        };
        let records = vec![
            row(date(2024, 1, 3), 100, 10, 2),
            row(date(2024, 1, 9), 100, 0, 0),
            row(date(2024, 2, 1), 0, 0, 0),
        ];
        let trends = campaign_trends(&records);

        assert_eq!(
            trends.monthly_impressions,
            vec![("2024-01".to_string(), 200), ("2024-02".to_string(), 0)]
        );
        assert_eq!(trends.monthly_ctr[0].1, Some(0.05));
        assert_eq!(trends.monthly_ctr[1].1, None);
        assert_eq!(trends.conversion_vs_spend.len(), 1);
        assert!((trends.conversion_vs_spend[0].conversion_rate - 0.2).abs() < 1e-12);
    }
}
