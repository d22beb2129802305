use crate::error::{ChartError, ChartResult};
use crate::parser::{parse_color, LineType, Marker, PercentFormat};
use crate::resolve::Role;
use plotters::style::RGBColor;
use std::fmt;
use tracing::warn;

// =============================================================================
// Chart specification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Histogram,
    Pie,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Histogram => "histogram",
            ChartKind::Pie => "pie",
        };
        f.write_str(name)
    }
}

/// Caller-chosen column names, one per role. `None` means positional fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSelectors {
    pub x: Option<String>,
    pub y: Option<String>,
    pub label: Option<String>,
    pub value: Option<String>,
}

impl ColumnSelectors {
    pub fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::X => self.x.as_deref(),
            Role::Y => self.y.as_deref(),
            Role::Label => self.label.as_deref(),
            Role::Value => self.value.as_deref(),
        }
    }
}

/// Plot labels (title, axes)
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarStyle {
    pub labels: Labels,
    pub color: RGBColor,
    pub horizontal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub labels: Labels,
    pub color: RGBColor,
    pub line_type: LineType,
    pub marker: Marker,
}

/// Upper bound on histogram bins; each bin costs an allocation slot and a drawn bar.
pub const MAX_BINS: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramStyle {
    pub labels: Labels,
    pub bins: usize,
    pub color: RGBColor,
    /// Always within `[0, 1]`
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieStyle {
    pub title: String,
    /// Empty means the default palette
    pub colors: Vec<RGBColor>,
    pub autopct: Option<PercentFormat>,
    /// Degrees counter-clockwise from the positive x axis
    pub start_angle: f64,
}

impl BarStyle {
    pub fn new(labels: Labels, color: &str, horizontal: bool) -> ChartResult<Self> {
        Ok(Self {
            labels,
            color: parse_color(color)?,
            horizontal,
        })
    }
}

impl LineStyle {
    pub fn new(labels: Labels, color: &str, line_style: &str, marker: &str) -> ChartResult<Self> {
        Ok(Self {
            labels,
            color: parse_color(color)?,
            line_type: LineType::parse(line_style)?,
            marker: Marker::parse(marker)?,
        })
    }
}

impl HistogramStyle {
    /// Builds the style; `alpha` is clamped into `[0, 1]` rather than rejected.
    pub fn new(labels: Labels, bins: usize, color: &str, alpha: f64) -> ChartResult<Self> {
        if bins == 0 {
            return Err(ChartError::invalid_value("histogram needs at least one bin"));
        }
        if bins > MAX_BINS {
            return Err(ChartError::invalid_value(format!(
                "histogram supports at most {} bins, got {}",
                MAX_BINS, bins
            )));
        }
        Ok(Self {
            labels,
            bins,
            color: parse_color(color)?,
            alpha: clamp_alpha(alpha),
        })
    }
}

impl PieStyle {
    pub fn new(
        title: String,
        colors: &[String],
        autopct: &str,
        start_angle: f64,
    ) -> ChartResult<Self> {
        let colors = colors
            .iter()
            .map(|c| parse_color(c))
            .collect::<ChartResult<Vec<_>>>()?;
        Ok(Self {
            title,
            colors,
            autopct: PercentFormat::parse(autopct)?,
            start_angle,
        })
    }
}

fn clamp_alpha(alpha: f64) -> f64 {
    if alpha.is_nan() {
        warn!("alpha is NaN, using 1.0");
        return 1.0;
    }
    let clamped = alpha.clamp(0.0, 1.0);
    if clamped != alpha {
        warn!(alpha, clamped, "alpha outside [0, 1], clamped");
    }
    clamped
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleConfig {
    Bar(BarStyle),
    Line(LineStyle),
    Histogram(HistogramStyle),
    Pie(PieStyle),
}

/// Validated request: which chart, which columns, how it looks.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub selectors: ColumnSelectors,
    pub style: StyleConfig,
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        match self.style {
            StyleConfig::Bar(_) => ChartKind::Bar,
            StyleConfig::Line(_) => ChartKind::Line,
            StyleConfig::Histogram(_) => ChartKind::Histogram,
            StyleConfig::Pie(_) => ChartKind::Pie,
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// Successful render: the encoded image plus any non-fatal notes.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedResult {
    pub data_uri: String,
    pub warnings: Vec<String>,
}
