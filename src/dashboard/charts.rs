//! Dashboard Charts
//!
//! The dashboard shows two fixed demo charts: a toxicity trend line and a
//! material performance comparison. Charts are described as plain
//! configuration ([`ChartConfig`]) and handed to a [`ChartRenderer`]; the
//! configuration serializes to the JSON shape browser charting libraries
//! accept.

use serde::Serialize;

use super::error::DashboardError;
use crate::dom::Document;

/// Surface id for the toxicity trend chart
pub const TREND_SURFACE: &str = "toxicityChart";

/// Surface id for the performance comparison chart
pub const COMPARISON_SURFACE: &str = "performanceChart";

/// Shared brand colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette;

impl Palette {
    pub const PRIMARY: &'static str = "#1FAF9A";
    pub const PRIMARY_DARK: &'static str = "#0E8F83";
    pub const SAFE: &'static str = "#2ECA7F";
    pub const WARNING: &'static str = "#FFB020";
    pub const DANGER: &'static str = "#FF5A5F";
    pub const GRID: &'static str = "rgba(0,0,0,0.03)";

    /// Light fill under the trend line
    pub const PRIMARY_FILL: &'static str = "rgba(31, 175, 154, 0.1)";
    /// Bars for the baseline material
    pub const BASELINE: &'static str = "rgba(200, 200, 200, 0.5)";
    pub const TOOLTIP_BACKGROUND: &'static str = "rgba(31, 45, 44, 0.9)";
}

/// Global defaults applied to the renderer before any chart is built
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDefaults {
    pub font_family: String,
    pub color: String,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        Self {
            font_family: "Poppins, sans-serif".to_string(),
            color: "#5B706E".to_string(),
        }
    }
}

/// Chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// Complete description of one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    /// Short name used in logs and errors
    #[serde(skip)]
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(flatten)]
    pub style: DatasetStyle,
}

/// Per-dataset visual attributes; unset fields use the renderer's defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub plugins: Plugins,
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<LegendPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<LegendAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<LegendLabels>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendAlign {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendLabels {
    pub use_point_style: bool,
    pub box_width: u32,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub background_color: String,
    pub padding: u32,
    pub title_font: Font,
    pub body_font: Font,
    pub corner_radius: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_colors: Option<bool>,
}

impl Tooltip {
    /// Dark rounded tooltip shared by both charts
    fn dark(body_font: Font) -> Self {
        Self {
            background_color: Palette::TOOLTIP_BACKGROUND.to_string(),
            padding: 12,
            title_font: Font::size(13),
            body_font,
            corner_radius: 8,
            display_colors: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

impl Font {
    pub fn size(size: u32) -> Self {
        Self { size, weight: None }
    }

    pub fn bold(size: u32) -> Self {
        Self {
            size,
            weight: Some("bold".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub grid: Grid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Axis {
    /// Category axis without grid lines
    fn bare() -> Self {
        Self {
            grid: Grid {
                display: Some(false),
                color: None,
            },
            begin_at_zero: None,
            max: None,
        }
    }

    /// Value axis running from zero to `max` over a faint grid
    fn zero_to(max: f64) -> Self {
        Self {
            grid: Grid {
                display: None,
                color: Some(Palette::GRID.to_string()),
            },
            begin_at_zero: Some(true),
            max: Some(max),
        }
    }

    /// Value range `(min, max)` when the axis is clamped at both ends
    pub fn range(&self) -> Option<(f64, f64)> {
        match (self.begin_at_zero, self.max) {
            (Some(true), Some(max)) => Some((0.0, max)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChartConfig {
    /// Check that every dataset has one value per label
    pub fn validate(&self) -> Result<(), DashboardError> {
        let expected = self.data.labels.len();
        for dataset in &self.data.datasets {
            if dataset.data.len() != expected {
                return Err(DashboardError::InvalidChart {
                    chart: self.name.to_string(),
                    dataset: dataset.label.clone(),
                    expected,
                    actual: dataset.data.len(),
                });
            }
        }
        Ok(())
    }

    /// JSON form handed to a browser charting library
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Average toxicity over the last six months
pub fn trend_chart() -> ChartConfig {
    let mut tooltip = Tooltip::dark(Font::bold(14));
    tooltip.display_colors = Some(false);

    ChartConfig {
        name: "trend",
        kind: ChartKind::Line,
        data: ChartData {
            labels: labels(&["Jan", "Feb", "Mar", "Apr", "May", "Jun"]),
            datasets: vec![Dataset {
                label: "Avg Toxicity Level".to_string(),
                data: vec![4.2, 3.8, 3.1, 2.9, 2.6, 2.4],
                style: DatasetStyle {
                    border_color: Some(Palette::PRIMARY.to_string()),
                    background_color: Some(Palette::PRIMARY_FILL.to_string()),
                    border_width: Some(3),
                    tension: Some(0.4),
                    fill: Some(true),
                    point_background_color: Some("white".to_string()),
                    point_border_color: Some(Palette::PRIMARY.to_string()),
                    point_border_width: Some(2),
                    point_radius: Some(4),
                    point_hover_radius: Some(6),
                    ..Default::default()
                },
            }],
        },
        options: ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            plugins: Plugins {
                legend: Legend {
                    display: false,
                    position: None,
                    align: None,
                    labels: None,
                },
                tooltip,
            },
            scales: Scales {
                x: Axis::bare(),
                y: Axis::zero_to(6.0),
            },
        },
    }
}

/// Baseline material against its safer alternative
pub fn comparison_chart() -> ChartConfig {
    let bar = |label: &str, data: Vec<f64>, color: &str| Dataset {
        label: label.to_string(),
        data,
        style: DatasetStyle {
            background_color: Some(color.to_string()),
            border_radius: Some(6),
            ..Default::default()
        },
    };

    ChartConfig {
        name: "comparison",
        kind: ChartKind::Bar,
        data: ChartData {
            labels: labels(&["Thermal", "Tensile", "Flexibility", "Durability"]),
            datasets: vec![
                bar("Original (BPA)", vec![85.0, 90.0, 60.0, 88.0], Palette::BASELINE),
                bar("Alternative (Tritan)", vec![82.0, 88.0, 75.0, 92.0], Palette::PRIMARY),
            ],
        },
        options: ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            plugins: Plugins {
                legend: Legend {
                    display: true,
                    position: Some(LegendPosition::Top),
                    align: Some(LegendAlign::End),
                    labels: Some(LegendLabels {
                        use_point_style: true,
                        box_width: 8,
                        font: Font::size(12),
                    }),
                },
                tooltip: Tooltip::dark(Font::size(13)),
            },
            scales: Scales {
                x: Axis::bare(),
                y: Axis::zero_to(100.0),
            },
        },
    }
}

/// Charting capability
pub trait ChartRenderer {
    /// Apply library-wide defaults
    fn apply_defaults(&mut self, _defaults: &ChartDefaults) {}

    /// Build a chart on the given surface
    fn render(&mut self, surface: &str, config: &ChartConfig);
}

/// Renderer that logs each chart as JSON
#[derive(Debug, Default)]
pub struct LogRenderer;

impl ChartRenderer for LogRenderer {
    fn apply_defaults(&mut self, defaults: &ChartDefaults) {
        tracing::info!(
            font = %defaults.font_family,
            color = %defaults.color,
            "Chart defaults applied"
        );
    }

    fn render(&mut self, surface: &str, config: &ChartConfig) {
        match config.to_json() {
            Ok(json) => tracing::info!(surface, chart = config.name, "Chart rendered: {}", json),
            Err(e) => tracing::warn!(surface, chart = config.name, "Failed to encode chart: {}", e),
        }
    }
}

/// Builds the dashboard charts when the page can show them
pub struct ChartBootstrap;

impl ChartBootstrap {
    /// Render both charts if both surfaces exist and a renderer is available
    ///
    /// Returns the number of charts rendered: 2 or 0.
    pub fn run(document: &Document, renderer: Option<&mut dyn ChartRenderer>) -> usize {
        let Some(renderer) = renderer else {
            tracing::debug!("No chart renderer available; skipping charts");
            return 0;
        };

        if !document.contains(TREND_SURFACE) || !document.contains(COMPARISON_SURFACE) {
            tracing::debug!("Chart surfaces not on this page; skipping charts");
            return 0;
        }

        Self::render_all(
            renderer,
            &[
                (TREND_SURFACE, trend_chart()),
                (COMPARISON_SURFACE, comparison_chart()),
            ],
        )
    }

    /// Render every chart, or none if any of them is malformed
    fn render_all(renderer: &mut dyn ChartRenderer, charts: &[(&str, ChartConfig)]) -> usize {
        for (surface, config) in charts {
            if let Err(e) = config.validate() {
                tracing::warn!(surface, "Skipping charts: {}", e);
                return 0;
            }
        }

        renderer.apply_defaults(&ChartDefaults::default());
        for (surface, config) in charts {
            renderer.render(surface, config);
        }
        charts.len()
    }
}
