//! Retail analytics — CSV loading, row validation, customer and campaign
//! metrics, and the trend series behind the charts.

pub mod campaign;
pub mod customer;
pub mod loader;
pub mod schema;
pub mod trends;
pub mod validation;

pub use campaign::{compute_campaign_metrics, CampaignMetrics, CampaignPerformance};
pub use customer::{compute_customer_metrics, CustomerMetrics, RetentionResult};
pub use loader::load_table;
pub use schema::{campaign_schema, transaction_schema};
pub use trends::{campaign_trends, customer_trends, CampaignTrends, CustomerTrends};
pub use validation::{
    validate_campaigns, validate_transactions, ExclusionLedger, ExclusionReason, ValidatedRows,
};
