//! SVG charts for the analysis pipelines. A [`ChartSpec`] describes one
//! figure; [`render_svg`] turns it into a self-contained SVG document.

pub mod axes;
pub mod canvas;
pub mod color;

use std::f64::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use insights_core::config::ChartConfig;
use insights_core::error::{InsightsError, InsightsResult};
use tracing::{debug, info};

use axes::Axis;
use canvas::{Canvas, Style, TextAnchor, TextStyle};
use color::{palette, GRID, MUTED};

const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 44.0;
const MARGIN_BOTTOM: f64 = 84.0;
const MAX_CATEGORY_LABELS: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// One bar per category; undefined values leave an empty slot.
    Bar {
        categories: Vec<String>,
        values: Vec<Option<f64>>,
    },
    /// Evenly spaced points joined in order; undefined values break the line.
    Line {
        labels: Vec<String>,
        values: Vec<Option<f64>>,
    },
    Scatter { points: Vec<(f64, f64)> },
    Pie { slices: Vec<(String, f64)> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub file_name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
}

impl ChartSpec {
    pub fn new(file_name: impl Into<String>, title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            file_name: file_name.into(),
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            kind,
        }
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// True when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Bar { values, .. } | ChartKind::Line { values, .. } => {
                !values.iter().flatten().any(|v| v.is_finite())
            }
            ChartKind::Scatter { points } => {
                !points.iter().any(|(x, y)| x.is_finite() && y.is_finite())
            }
            ChartKind::Pie { slices } => !slices.iter().any(|(_, v)| *v > 0.0 && v.is_finite()),
        }
    }
}

struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl PlotArea {
    fn for_figure(width: f64, height: f64) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: (width - MARGIN_RIGHT).max(MARGIN_LEFT + 1.0),
            bottom: (height - MARGIN_BOTTOM).max(MARGIN_TOP + 1.0),
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Render one chart. An empty chart renders a titled placeholder.
pub fn render_svg(chart: &ChartSpec, config: &ChartConfig) -> InsightsResult<String> {
    let mut canvas = Canvas::new(config.width, config.height);
    let area = PlotArea::for_figure(config.width, config.height);
    draw_title(&mut canvas, &chart.title);

    if chart.is_empty() {
        debug!(chart = %chart.file_name, "No data, rendering placeholder");
        canvas.text(
            config.width / 2.0,
            config.height / 2.0,
            "No data available",
            &TextStyle {
                size: 12.0,
                color: MUTED,
                anchor: TextAnchor::Middle,
                ..Default::default()
            },
        );
    } else {
        match &chart.kind {
            ChartKind::Bar { categories, values } => draw_bars(&mut canvas, &area, categories, values),
            ChartKind::Line { labels, values } => draw_line(&mut canvas, &area, labels, values),
            ChartKind::Scatter { points } => draw_scatter(&mut canvas, &area, points),
            ChartKind::Pie { slices } => draw_pie(&mut canvas, &area, slices),
        }
        if !matches!(chart.kind, ChartKind::Pie { .. }) {
            draw_axis_labels(&mut canvas, &area, config, &chart.x_label, &chart.y_label);
        }
    }

    canvas
        .finish_svg()
        .map_err(|e| InsightsError::Render(format!("{}: {e}", chart.file_name)))
}

/// Render every chart into `dir`, overwriting existing files.
pub fn write_charts(
    dir: &Path,
    charts: &[ChartSpec],
    config: &ChartConfig,
) -> InsightsResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let svg = render_svg(chart, config)?;
        let path = dir.join(&chart.file_name);
        fs::write(&path, svg)?;
        debug!(path = %path.display(), "Chart written");
        written.push(path);
    }
    info!(charts = written.len(), dir = %dir.display(), "Charts written");
    Ok(written)
}

fn draw_title(canvas: &mut Canvas, title: &str) {
    let x = canvas.width / 2.0;
    canvas.text(
        x,
        26.0,
        title,
        &TextStyle {
            size: 14.0,
            anchor: TextAnchor::Middle,
            bold: true,
            ..Default::default()
        },
    );
}

fn draw_axis_labels(
    canvas: &mut Canvas,
    area: &PlotArea,
    config: &ChartConfig,
    x_label: &str,
    y_label: &str,
) {
    let style = TextStyle {
        size: 11.0,
        anchor: TextAnchor::Middle,
        ..Default::default()
    };
    if !x_label.is_empty() {
        canvas.text(area.left + area.width() / 2.0, config.height - 10.0, x_label, &style);
    }
    if !y_label.is_empty() {
        let y = area.top + area.height() / 2.0;
        canvas.text_rotated(16.0, y, y_label, &style, -90.0);
    }
}

/// Horizontal grid lines and tick labels for a value axis.
fn draw_y_axis(canvas: &mut Canvas, area: &PlotArea, axis: &Axis) {
    let tick_style = TextStyle {
        size: 9.0,
        anchor: TextAnchor::End,
        ..Default::default()
    };
    for (value, label) in &axis.ticks {
        let y = axis.data_to_pixel(*value, area.bottom, area.top);
        canvas.line(area.left, y, area.right, y, GRID, 0.5);
        canvas.text(area.left - 6.0, y + 3.0, label, &tick_style);
    }
    canvas.line(area.left, area.top, area.left, area.bottom, MUTED, 1.0);
    canvas.line(area.left, area.bottom, area.right, area.bottom, MUTED, 1.0);
}

/// Rotated category labels under the plot, thinned when there are many.
fn draw_category_labels(canvas: &mut Canvas, area: &PlotArea, labels: &[String], centers: &[f64]) {
    let every = labels.len().div_ceil(MAX_CATEGORY_LABELS).max(1);
    let style = TextStyle {
        size: 9.0,
        anchor: TextAnchor::End,
        ..Default::default()
    };
    for (i, (label, x)) in labels.iter().zip(centers).enumerate() {
        if i % every == 0 {
            canvas.text_rotated(*x, area.bottom + 12.0, label, &style, -35.0);
        }
    }
}

fn value_axis<'a>(values: impl Iterator<Item = &'a f64>, include_zero: bool) -> Axis {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(*v);
        hi = hi.max(*v);
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    Axis::auto_linear(lo, hi, 6)
}

fn slot_centers(area: &PlotArea, n: usize) -> Vec<f64> {
    let slot = area.width() / n.max(1) as f64;
    (0..n)
        .map(|i| area.left + slot * (i as f64 + 0.5))
        .collect()
}

fn draw_bars(canvas: &mut Canvas, area: &PlotArea, categories: &[String], values: &[Option<f64>]) {
    let axis = value_axis(values.iter().flatten(), true);
    draw_y_axis(canvas, area, &axis);

    let n = categories.len().max(values.len());
    let centers = slot_centers(area, n);
    let bar_width = area.width() / n.max(1) as f64 * 0.8;
    let zero = axis.data_to_pixel(0.0, area.bottom, area.top);

    for (i, value) in values.iter().enumerate() {
        let Some(v) = value.filter(|v| v.is_finite()) else {
            continue;
        };
        let y = axis.data_to_pixel(v, area.bottom, area.top);
        canvas.rect(
            centers[i] - bar_width / 2.0,
            y.min(zero),
            bar_width,
            (y - zero).abs(),
            &Style::filled(palette(0)),
        );
    }
    draw_category_labels(canvas, area, categories, &centers);
}

fn draw_line(canvas: &mut Canvas, area: &PlotArea, labels: &[String], values: &[Option<f64>]) {
    let axis = value_axis(values.iter().flatten(), false);
    draw_y_axis(canvas, area, &axis);

    let centers = slot_centers(area, labels.len().max(values.len()));
    let color = palette(0);
    let mut run: Vec<(f64, f64)> = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                let point = (centers[i], axis.data_to_pixel(v, area.bottom, area.top));
                canvas.circle(point.0, point.1, 2.5, &Style::filled(color));
                run.push(point);
            }
            None => {
                if run.len() > 1 {
                    canvas.polyline(&run, color, 1.5);
                }
                run.clear();
            }
        }
    }
    if run.len() > 1 {
        canvas.polyline(&run, color, 1.5);
    }
    draw_category_labels(canvas, area, labels, &centers);
}

fn draw_scatter(canvas: &mut Canvas, area: &PlotArea, points: &[(f64, f64)]) {
    let finite: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let x_axis = value_axis(finite.iter().map(|(x, _)| x), false);
    let y_axis = value_axis(finite.iter().map(|(_, y)| y), false);
    draw_y_axis(canvas, area, &y_axis);

    let tick_style = TextStyle {
        size: 9.0,
        anchor: TextAnchor::Middle,
        ..Default::default()
    };
    for (value, label) in &x_axis.ticks {
        let x = x_axis.data_to_pixel(*value, area.left, area.right);
        canvas.line(x, area.bottom, x, area.bottom + 4.0, MUTED, 1.0);
        canvas.text(x, area.bottom + 16.0, label, &tick_style);
    }

    let style = Style {
        fill: Some(palette(0)),
        stroke: Some(palette(0)),
        stroke_width: 0.5,
    };
    for (x, y) in finite {
        canvas.circle(
            x_axis.data_to_pixel(x, area.left, area.right),
            y_axis.data_to_pixel(y, area.bottom, area.top),
            3.0,
            &style,
        );
    }
}

fn draw_pie(canvas: &mut Canvas, area: &PlotArea, slices: &[(String, f64)]) {
    let positive: Vec<(&str, f64)> = slices
        .iter()
        .filter(|(_, v)| *v > 0.0 && v.is_finite())
        .map(|(name, v)| (name.as_str(), *v))
        .collect();
    let total: f64 = positive.iter().map(|(_, v)| v).sum();

    let cx = area.left + area.width() / 2.0;
    let cy = area.top + area.height() / 2.0;
    let r = (area.height().min(area.width()) / 2.0 - 10.0).max(10.0);
    let mut start_angle = -PI / 2.0;

    for (i, (name, value)) in positive.iter().enumerate() {
        let fraction = value / total;
        let sweep = 2.0 * PI * fraction;
        let steps = (sweep / 0.02).max(10.0) as usize;
        let mut pts = vec![(cx, cy)];
        for s in 0..=steps {
            let a = start_angle + sweep * s as f64 / steps as f64;
            pts.push((cx + r * a.cos(), cy + r * a.sin()));
        }
        canvas.polygon(&pts, &Style::filled(palette(i)));

        let mid_angle = start_angle + sweep / 2.0;
        if fraction > 0.03 {
            let anchor = if mid_angle.cos() < -0.1 {
                TextAnchor::End
            } else if mid_angle.cos() > 0.1 {
                TextAnchor::Start
            } else {
                TextAnchor::Middle
            };
            let label_r = r + 12.0;
            canvas.text(
                cx + label_r * mid_angle.cos(),
                cy + label_r * mid_angle.sin(),
                &format!("{name} ({:.1}%)", fraction * 100.0),
                &TextStyle {
                    size: 10.0,
                    anchor,
                    ..Default::default()
                },
            );
        }
        start_angle += sweep;
    }
}
