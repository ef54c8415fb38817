//! Retail Insights — batch analysis of customer transactions and marketing
//! campaigns.
//!
//! Each binary loads configuration, installs tracing, and calls one of the
//! `run_*` entry points below.

pub mod charts;
pub mod cli;
pub mod pipeline;
pub mod telemetry;

pub use cli::CommonArgs;
pub use pipeline::{run_campaign_analysis, run_customer_analysis, run_generate, AnalysisOutcome};
pub use telemetry::{init_tracing, LogFormat};
