use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{InsightsError, InsightsResult};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `RETAIL_INSIGHTS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Where inputs are read from and outputs written to.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_transactions_file")]
    pub transactions_file: String,
    #[serde(default = "default_campaigns_file")]
    pub campaigns_file: String,
    #[serde(default = "default_customer_metrics_file")]
    pub customer_metrics_file: String,
    #[serde(default = "default_campaign_metrics_file")]
    pub campaign_metrics_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// First day of the later retention window. Unset means the midpoint of
    /// the observed order-date range.
    #[serde(default)]
    pub split_date: Option<NaiveDate>,
    #[serde(default = "default_inactivity_days")]
    pub inactivity_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentationConfig {
    #[serde(default = "default_high_quantile")]
    pub high_quantile: f64,
    #[serde(default = "default_medium_quantile")]
    pub medium_quantile: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_charts_enabled")]
    pub enabled: bool,
    /// Figure width in points.
    #[serde(default = "default_chart_width")]
    pub width: f64,
    /// Figure height in points.
    #[serde(default = "default_chart_height")]
    pub height: f64,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Unset means a fresh seed from OS entropy on every run.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_customers")]
    pub customers: usize,
    #[serde(default = "default_transactions")]
    pub transactions: usize,
    #[serde(default = "default_campaigns")]
    pub campaigns: usize,
    #[serde(default = "default_days")]
    pub days: u32,
    /// Last day of generated activity. Unset means today.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_dirty_row_rate")]
    pub dirty_row_rate: f64,
}

// Default functions
fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_transactions_file() -> String {
    "customer_transactions.csv".to_string()
}
fn default_campaigns_file() -> String {
    "marketing_campaigns.csv".to_string()
}
fn default_customer_metrics_file() -> String {
    "customer_metrics.json".to_string()
}
fn default_campaign_metrics_file() -> String {
    "campaign_metrics.json".to_string()
}
fn default_inactivity_days() -> i64 {
    180
}
fn default_high_quantile() -> f64 {
    0.8
}
fn default_medium_quantile() -> f64 {
    0.5
}
fn default_charts_enabled() -> bool {
    true
}
fn default_chart_width() -> f64 {
    864.0
}
fn default_chart_height() -> f64 {
    432.0
}
fn default_histogram_bins() -> usize {
    50
}
fn default_customers() -> usize {
    500
}
fn default_transactions() -> usize {
    5000
}
fn default_campaigns() -> usize {
    10
}
fn default_days() -> u32 {
    365
}
fn default_dirty_row_rate() -> f64 {
    0.01
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            transactions_file: default_transactions_file(),
            campaigns_file: default_campaigns_file(),
            customer_metrics_file: default_customer_metrics_file(),
            campaign_metrics_file: default_campaign_metrics_file(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            split_date: None,
            inactivity_days: default_inactivity_days(),
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            high_quantile: default_high_quantile(),
            medium_quantile: default_medium_quantile(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: default_charts_enabled(),
            width: default_chart_width(),
            height: default_chart_height(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            customers: default_customers(),
            transactions: default_transactions(),
            campaigns: default_campaigns(),
            days: default_days(),
            end_date: None,
            dirty_row_rate: default_dirty_row_rate(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            retention: RetentionConfig::default(),
            segmentation: SegmentationConfig::default(),
            charts: ChartConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl PathsConfig {
    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(&self.transactions_file)
    }

    pub fn campaigns_path(&self) -> PathBuf {
        self.data_dir.join(&self.campaigns_file)
    }

    pub fn customer_metrics_path(&self) -> PathBuf {
        self.output_dir.join(&self.customer_metrics_file)
    }

    pub fn campaign_metrics_path(&self) -> PathBuf {
        self.output_dir.join(&self.campaign_metrics_file)
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file and environment variables.
    ///
    /// With no explicit file, `insights.toml` in the working directory is used
    /// when present. Environment variables win over file values.
    pub fn load(file: Option<&Path>) -> InsightsResult<Self> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("insights").required(false),
        };

        let builder = config::Config::builder().add_source(file_source).add_source(
            config::Environment::with_prefix("RETAIL_INSIGHTS")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> InsightsResult<()> {
        let seg = &self.segmentation;
        for (name, q) in [
            ("high_quantile", seg.high_quantile),
            ("medium_quantile", seg.medium_quantile),
        ] {
            if !(q > 0.0 && q < 1.0) {
                return Err(InsightsError::Config(format!(
                    "segmentation.{name} must be within (0, 1), got {q}"
                )));
            }
        }
        if seg.medium_quantile >= seg.high_quantile {
            return Err(InsightsError::Config(format!(
                "segmentation.medium_quantile ({}) must be below high_quantile ({})",
                seg.medium_quantile, seg.high_quantile
            )));
        }
        if self.charts.histogram_bins == 0 {
            return Err(InsightsError::Config(
                "charts.histogram_bins must be at least 1".to_string(),
            ));
        }
        if !(self.charts.width > 0.0 && self.charts.height > 0.0) {
            return Err(InsightsError::Config(
                "charts.width and charts.height must be positive".to_string(),
            ));
        }
        if self.retention.inactivity_days < 0 {
            return Err(InsightsError::Config(
                "retention.inactivity_days must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.generator.dirty_row_rate) {
            return Err(InsightsError::Config(format!(
                "generator.dirty_row_rate must be within [0, 1], got {}",
                self.generator.dirty_row_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.paths.transactions_path(),
            PathBuf::from("./customer_transactions.csv")
        );
        assert_eq!(config.retention.inactivity_days, 180);
        assert!(config.retention.split_date.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[paths]
data_dir = "input"

[retention]
split_date = "2024-03-01"

[segmentation]
high_quantile = 0.9
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("input"));
        assert_eq!(
            config.retention.split_date,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert!((config.segmentation.high_quantile - 0.9).abs() < 1e-9);
        assert!((config.segmentation.medium_quantile - 0.5).abs() < 1e-9);
        assert_eq!(config.paths.campaigns_file, "marketing_campaigns.csv");
    }

    #[test]
    fn test_validate_rejects_inverted_quantiles() {
        let mut config = AppConfig::default();
        config.segmentation.medium_quantile = 0.9;
        config.segmentation.high_quantile = 0.6;
        assert!(matches!(config.validate(), Err(InsightsError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_bins() {
        let mut config = AppConfig::default();
        config.charts.histogram_bins = 0;
        assert!(config.validate().is_err());
    }
}
