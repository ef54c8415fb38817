//! Customer segmentation by total spend — quantile cutoffs and value tiers.

pub mod engine;
pub mod quantile;

pub use engine::{SpendSegmentation, SpendSegmenter, TierSummary, ValueTier};
