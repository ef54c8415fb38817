//! Report output — metrics JSON files and SVG charts.

pub mod charts;
pub mod export;

pub use charts::{render_svg, write_charts, ChartKind, ChartSpec};
pub use export::{render_json, write_metrics};
