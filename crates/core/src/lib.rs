//! Shared building blocks for the retail insights pipelines: configuration,
//! errors, the typed table, record types, and metric values.

pub mod config;
pub mod error;
pub mod table;
pub mod types;

pub use config::AppConfig;
pub use error::{InsightsError, InsightsResult, LoadError};
pub use table::{Column, ColumnData, ColumnSpec, ColumnType, Schema, Table};
pub use types::{CampaignRecord, MetricReport, MetricValue, TransactionRecord};
