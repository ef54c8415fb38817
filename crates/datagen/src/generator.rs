//! Synthetic transaction and campaign data.
//!
//! The generator is fully deterministic given a seed and an end date. Rows are
//! produced as CSV-ready text so dirty rows can carry values the loader must
//! reject.

use chrono::{Duration, NaiveDate};
use insights_core::config::GeneratorConfig;
use insights_core::error::{InsightsError, InsightsResult};
use insights_core::types::TransactionRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Builder;

pub const CATEGORIES: [&str; 8] = [
    "Electronics",
    "Clothing",
    "Home & Garden",
    "Books",
    "Sports",
    "Beauty",
    "Toys",
    "Grocery",
];

pub const CHANNELS: [&str; 5] = ["Email", "Social Media", "Search", "Display", "Affiliate"];

/// Share of campaign-days that are paused: no spend and no activity.
const PAUSED_DAY_RATE: f64 = 0.02;

pub type TransactionRow = [String; 6];
pub type CampaignRow = [String; 8];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyKind {
    Duplicate,
    MissingCustomer,
    NonNumericAmount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyCounts {
    pub duplicates: usize,
    pub missing_customer: usize,
    pub non_numeric_amount: usize,
}

impl DirtyCounts {
    pub fn total(&self) -> usize {
        self.duplicates + self.missing_customer + self.non_numeric_amount
    }
}

pub struct DataGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    seed: u64,
    end_date: NaiveDate,
}

impl DataGenerator {
    /// `end_date` is used when the configuration does not pin one.
    pub fn new(config: &GeneratorConfig, seed: u64, end_date: NaiveDate) -> InsightsResult<Self> {
        if config.days == 0 {
            return Err(InsightsError::Generate("generator.days must be > 0".into()));
        }
        if config.customers == 0 && config.transactions > 0 {
            return Err(InsightsError::Generate(
                "generator.customers must be > 0 to generate transactions".into(),
            ));
        }
        if !(0.0..=1.0).contains(&config.dirty_row_rate) {
            return Err(InsightsError::Generate(
                "generator.dirty_row_rate must be in [0, 1]".into(),
            ));
        }
        Ok(Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            end_date: config.end_date.unwrap_or(end_date),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn start_date(&self) -> NaiveDate {
        self.end_date - Duration::days(i64::from(self.config.days) - 1)
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    fn random_day(&mut self) -> NaiveDate {
        self.start_date() + Duration::days(self.rng.gen_range(0..i64::from(self.config.days)))
    }

    /// Standard normal draw via Box-Muller.
    fn standard_normal(&mut self) -> f64 {
        let u1: f64 = self.rng.gen::<f64>().clamp(1e-10, 1.0 - 1e-10);
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    fn jitter(&mut self) -> f64 {
        self.rng.gen_range(0.7..1.3)
    }

    fn transaction_id(&mut self) -> String {
        Builder::from_random_bytes(self.rng.gen()).into_uuid().to_string()
    }

    /// Clean, date-ordered orders. Customer activity is skewed so a few
    /// customers place many orders.
    pub fn orders(&mut self) -> Vec<TransactionRecord> {
        let customers = self.config.customers;
        let start = self.start_date();
        let signups: Vec<NaiveDate> = (0..customers)
            .map(|_| start - Duration::days(self.rng.gen_range(0..365)))
            .collect();

        let mut orders = Vec::with_capacity(self.config.transactions);
        for _ in 0..self.config.transactions {
            let skew: f64 = self.rng.gen::<f64>().powi(2);
            let customer = ((skew * customers as f64) as usize).min(customers - 1);
            let order_date = self.random_day();
            let category = CATEGORIES[self.rng.gen_range(0..CATEGORIES.len())];
            // Log-normal amounts with a median around 45.
            let amount = (3.8 + 0.8 * self.standard_normal()).exp().max(1.0);

            orders.push(TransactionRecord {
                transaction_id: self.transaction_id(),
                customer_id: format!("CUST-{:05}", customer + 1),
                order_date,
                amount: (amount * 100.0).round() / 100.0,
                category: Some(category.to_string()),
                signup_date: Some(signups[customer]),
            });
        }
        orders.sort_by(|a, b| {
            a.order_date
                .cmp(&b.order_date)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
        orders
    }

    /// Transaction rows with dirty rows mixed in at `dirty_row_rate`.
    pub fn transaction_rows(&mut self) -> (Vec<TransactionRow>, DirtyCounts) {
        let orders = self.orders();
        let mut rows = Vec::with_capacity(orders.len());
        let mut dirty = DirtyCounts::default();

        for order in &orders {
            let mut row = transaction_row(order);
            if !self.rng.gen_bool(self.config.dirty_row_rate) {
                rows.push(row);
                continue;
            }
            match self.dirty_kind() {
                DirtyKind::Duplicate => {
                    rows.push(row.clone());
                    dirty.duplicates += 1;
                }
                DirtyKind::MissingCustomer => {
                    row[1] = String::new();
                    dirty.missing_customer += 1;
                }
                DirtyKind::NonNumericAmount => {
                    row[3] = "N/A".to_string();
                    dirty.non_numeric_amount += 1;
                }
            }
            rows.push(row);
        }
        (rows, dirty)
    }

    fn dirty_kind(&mut self) -> DirtyKind {
        match self.rng.gen_range(0..3) {
            0 => DirtyKind::Duplicate,
            1 => DirtyKind::MissingCustomer,
            _ => DirtyKind::NonNumericAmount,
        }
    }

    /// One row per active day per campaign. Each campaign runs 30 to 90 days
    /// inside the generated window.
    pub fn campaign_rows(&mut self) -> Vec<CampaignRow> {
        let days = i64::from(self.config.days);
        let start = self.start_date();
        let mut rows = Vec::new();

        for i in 0..self.config.campaigns {
            let id = format!("CMP-{:03}", i + 1);
            let channel = CHANNELS[self.rng.gen_range(0..CHANNELS.len())];
            let ctr = self.rng.gen_range(0.005..0.05);
            let conversion_rate = self.rng.gen_range(0.01..0.10);
            let cpm = self.rng.gen_range(2.0..15.0);
            let order_value = self.rng.gen_range(30.0..120.0);
            let length = self.rng.gen_range(30..=90).min(days);
            let offset = self.rng.gen_range(0..=days - length);

            for day in 0..length {
                let date = start + Duration::days(offset + day);
                if self.rng.gen_bool(PAUSED_DAY_RATE) {
                    rows.push(campaign_row(&id, date, channel, 0.0, 0, 0, 0, 0.0));
                    continue;
                }
                let impressions: u64 = self.rng.gen_range(1_000..20_000);
                let clicks =
                    ((impressions as f64 * ctr * self.jitter()).round() as u64).min(impressions);
                let conversions =
                    ((clicks as f64 * conversion_rate * self.jitter()).round() as u64).min(clicks);
                let spend = round_cents(impressions as f64 / 1000.0 * cpm);
                let revenue = round_cents(conversions as f64 * order_value * self.jitter());
                rows.push(campaign_row(
                    &id,
                    date,
                    channel,
                    spend,
                    impressions,
                    clicks,
                    conversions,
                    revenue,
                ));
            }
        }
        rows
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn transaction_row(order: &TransactionRecord) -> TransactionRow {
    [
        order.transaction_id.clone(),
        order.customer_id.clone(),
        order.order_date.to_string(),
        format!("{:.2}", order.amount),
        order.category.clone().unwrap_or_default(),
        order.signup_date.map(|d| d.to_string()).unwrap_or_default(),
    ]
}

#[allow(clippy::too_many_arguments)]
fn campaign_row(
    id: &str,
    date: NaiveDate,
    channel: &str,
    spend: f64,
    impressions: u64,
    clicks: u64,
    conversions: u64,
    revenue: f64,
) -> CampaignRow {
    [
        id.to_string(),
        date.to_string(),
        channel.to_string(),
        format!("{spend:.2}"),
        impressions.to_string(),
        clicks.to_string(),
        conversions.to_string(),
        format!("{revenue:.2}"),
    ]
}
