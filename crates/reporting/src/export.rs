use std::fs;
use std::path::Path;

use insights_core::error::InsightsResult;
use insights_core::types::MetricReport;
use tracing::info;

/// Render a report as pretty JSON. Keys are sorted, undefined metrics are
/// `null`, and the text ends with a newline.
pub fn render_json(report: &MetricReport) -> InsightsResult<String> {
    let mut text = serde_json::to_string_pretty(report)?;
    text.push('\n');
    Ok(text)
}

/// Write a report to `path`, replacing any existing file and creating the
/// parent directory when needed.
pub fn write_metrics(path: &Path, report: &MetricReport) -> InsightsResult<()> {
    let text = render_json(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    info!(path = %path.display(), metrics = report.len(), "Metrics written");
    Ok(())
}
