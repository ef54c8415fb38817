use std::path::PathBuf;

use clap::Args;
use insights_core::config::AppConfig;
use insights_core::error::InsightsResult;

use crate::telemetry::LogFormat;

/// Flags shared by every binary. Each one overrides the matching config value.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// TOML config file (default: ./insights.toml when present)
    #[arg(long, env = "RETAIL_INSIGHTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the input CSV files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory for metrics files and charts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

impl CommonArgs {
    pub fn load_config(&self) -> InsightsResult<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.paths.data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.paths.output_dir = dir.clone();
        }
    }
}
