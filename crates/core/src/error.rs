use std::path::PathBuf;

use thiserror::Error;

pub type InsightsResult<T> = Result<T, InsightsError>;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("table is missing column '{0}'")]
    MissingColumn(String),

    #[error("Chart rendering error: {0}")]
    Render(String),

    #[error("Data generation error: {0}")]
    Generate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for InsightsError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Fatal failure to turn an input file into a table. Always names the file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("input file {path} not found")]
    NotFound { path: PathBuf },

    #[error("input file {path} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input file {path} is malformed at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("input file {path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("input file {path} has no header row")]
    Empty { path: PathBuf },
}

impl LoadError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::NotFound { path }
            | Self::Unreadable { path, .. }
            | Self::Malformed { path, .. }
            | Self::MissingColumn { path, .. }
            | Self::Empty { path } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_names_file_and_reason() {
        let err = LoadError::MissingColumn {
            path: PathBuf::from("data/customer_transactions.csv"),
            column: "Order Amount".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("customer_transactions.csv"));
        assert!(msg.contains("Order Amount"));
        assert_eq!(err.path(), &PathBuf::from("data/customer_transactions.csv"));
    }

    #[test]
    fn test_load_error_converts_transparently() {
        let err: InsightsError = LoadError::NotFound {
            path: PathBuf::from("missing.csv"),
        }
        .into();
        assert_eq!(err.to_string(), "input file missing.csv not found");
    }
}
