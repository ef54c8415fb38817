//! Chart layouts for the two pipelines.

use insights_analytics::campaign::CampaignMetrics;
use insights_analytics::customer::CustomerMetrics;
use insights_analytics::trends::{CampaignTrends, CustomerTrends};
use insights_reporting::{ChartKind, ChartSpec};

pub const REVENUE_OVER_TIME: &str = "viz_revenue_over_time.svg";
pub const CATEGORY_REVENUE: &str = "viz_category_revenue.svg";
pub const ORDER_DISTRIBUTION: &str = "viz_order_distribution.svg";
pub const DAY_OF_WEEK: &str = "viz_day_of_week.svg";
pub const CUSTOMER_SEGMENTS: &str = "viz_customer_segments.svg";

pub const CAMPAIGN_ROI: &str = "viz_campaign_roi.svg";
pub const CONV_RATE_VS_SPEND: &str = "viz_conv_rate_vs_spend.svg";
pub const IMPRESSIONS_TREND: &str = "viz_impressions_trend.svg";
pub const CTR_TREND: &str = "viz_ctr_trend.svg";

fn unzip_defined(series: &[(String, f64)]) -> (Vec<String>, Vec<Option<f64>>) {
    series
        .iter()
        .map(|(label, v)| (label.clone(), Some(*v)))
        .unzip()
}

pub fn customer_charts(metrics: &CustomerMetrics, trends: &CustomerTrends) -> Vec<ChartSpec> {
    let (months, revenue) = unzip_defined(&trends.monthly_revenue);
    let (categories, category_revenue) = unzip_defined(&trends.category_revenue);
    let (days, orders): (Vec<String>, Vec<Option<f64>>) = trends
        .orders_by_weekday
        .iter()
        .map(|(day, n)| (day.clone(), Some(*n as f64)))
        .unzip();
    let (bins, counts): (Vec<String>, Vec<Option<f64>>) = trends
        .amount_histogram
        .iter()
        .map(|b| (format!("{:.0}", b.lower), Some(b.count as f64)))
        .unzip();
    let slices = metrics
        .segmentation
        .tiers
        .iter()
        .map(|t| (t.tier.label().to_string(), t.customers as f64))
        .collect();

    vec![
        ChartSpec::new(
            REVENUE_OVER_TIME,
            "Revenue Over Time",
            ChartKind::Line {
                labels: months,
                values: revenue,
            },
        )
        .with_labels("Month", "Revenue"),
        ChartSpec::new(
            CATEGORY_REVENUE,
            "Revenue by Category",
            ChartKind::Bar {
                categories,
                values: category_revenue,
            },
        )
        .with_labels("Category", "Revenue"),
        ChartSpec::new(
            ORDER_DISTRIBUTION,
            "Order Amount Distribution",
            ChartKind::Bar {
                categories: bins,
                values: counts,
            },
        )
        .with_labels("Order Amount", "Orders"),
        ChartSpec::new(
            DAY_OF_WEEK,
            "Orders by Day of Week",
            ChartKind::Bar {
                categories: days,
                values: orders,
            },
        )
        .with_labels("Day", "Orders"),
        ChartSpec::new(CUSTOMER_SEGMENTS, "Customer Segments", ChartKind::Pie { slices }),
    ]
}

pub fn campaign_charts(metrics: &CampaignMetrics, trends: &CampaignTrends) -> Vec<ChartSpec> {
    let (ids, roi): (Vec<String>, Vec<Option<f64>>) = metrics
        .ranking
        .iter()
        .map(|c| (c.campaign_id.clone(), c.rates.roi))
        .unzip();
    let (months, impressions): (Vec<String>, Vec<Option<f64>>) = trends
        .monthly_impressions
        .iter()
        .map(|(m, n)| (m.clone(), Some(*n as f64)))
        .unzip();
    let (ctr_months, ctr): (Vec<String>, Vec<Option<f64>>) =
        trends.monthly_ctr.iter().cloned().unzip();
    let points = trends
        .conversion_vs_spend
        .iter()
        .map(|p| (p.spend, p.conversion_rate))
        .collect();

    vec![
        ChartSpec::new(
            CAMPAIGN_ROI,
            "ROI by Campaign",
            ChartKind::Bar {
                categories: ids,
                values: roi,
            },
        )
        .with_labels("Campaign", "ROI"),
        ChartSpec::new(
            CONV_RATE_VS_SPEND,
            "Conversion Rate vs Spend",
            ChartKind::Scatter { points },
        )
        .with_labels("Daily Spend", "Conversion Rate"),
        ChartSpec::new(
            IMPRESSIONS_TREND,
            "Impressions Over Time",
            ChartKind::Line {
                labels: months,
                values: impressions,
            },
        )
        .with_labels("Month", "Impressions"),
        ChartSpec::new(
            CTR_TREND,
            "Click-Through Rate Over Time",
            ChartKind::Line {
                labels: ctr_months,
                values: ctr,
            },
        )
        .with_labels("Month", "CTR"),
    ]
}
