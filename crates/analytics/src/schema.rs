//! Column layouts of the two input files.

use insights_core::table::{ColumnSpec, ColumnType, Schema};

pub mod transactions {
    pub const TRANSACTION_ID: &str = "Transaction ID";
    pub const CUSTOMER_ID: &str = "Customer ID";
    pub const ORDER_DATE: &str = "Order Date";
    pub const ORDER_AMOUNT: &str = "Order Amount";
    pub const CATEGORY: &str = "Category";
    pub const SIGNUP_DATE: &str = "Signup Date";
}

pub mod campaigns {
    pub const CAMPAIGN_ID: &str = "Campaign ID";
    pub const DATE: &str = "Date";
    pub const CHANNEL: &str = "Channel";
    pub const SPEND: &str = "Spend";
    pub const IMPRESSIONS: &str = "Impressions";
    pub const CLICKS: &str = "Clicks";
    pub const CONVERSIONS: &str = "Conversions";
    pub const REVENUE: &str = "Revenue";
}

pub fn transaction_schema() -> Schema {
    use transactions::*;
    Schema::new(vec![
        ColumnSpec::required(TRANSACTION_ID, ColumnType::Text),
        ColumnSpec::required(CUSTOMER_ID, ColumnType::Text),
        ColumnSpec::required(ORDER_DATE, ColumnType::Date),
        ColumnSpec::required(ORDER_AMOUNT, ColumnType::Float),
        ColumnSpec::optional(CATEGORY, ColumnType::Text),
        ColumnSpec::optional(SIGNUP_DATE, ColumnType::Date),
    ])
}

pub fn campaign_schema() -> Schema {
    use campaigns::*;
    Schema::new(vec![
        ColumnSpec::required(CAMPAIGN_ID, ColumnType::Text),
        ColumnSpec::required(DATE, ColumnType::Date),
        ColumnSpec::required(CHANNEL, ColumnType::Text),
        ColumnSpec::required(SPEND, ColumnType::Float),
        ColumnSpec::required(IMPRESSIONS, ColumnType::Integer),
        ColumnSpec::required(CLICKS, ColumnType::Integer),
        ColumnSpec::required(CONVERSIONS, ColumnType::Integer),
        ColumnSpec::required(REVENUE, ColumnType::Float),
    ])
}
