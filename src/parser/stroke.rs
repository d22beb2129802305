use crate::error::{ChartError, ChartResult};

/// Stroke pattern of a line series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Solid,
    Dashed,
    DashDot,
    Dotted,
    /// Points only, no connecting line
    None,
}

impl LineType {
    pub fn parse(input: &str) -> ChartResult<Self> {
        match input.trim() {
            "-" | "solid" => Ok(LineType::Solid),
            "--" | "dashed" => Ok(LineType::Dashed),
            "-." | "dashdot" => Ok(LineType::DashDot),
            ":" | "dotted" => Ok(LineType::Dotted),
            "" | "None" | "none" => Ok(LineType::None),
            _ => Err(ChartError::invalid_value(format!(
                "unknown line style '{}' (expected '-', '--', '-.', ':' or 'None')",
                input
            ))),
        }
    }

    /// Alternating on/off lengths in pixels; empty for a continuous stroke.
    pub fn dash_pattern(self) -> &'static [f64] {
        match self {
            LineType::Solid | LineType::None => &[],
            LineType::Dashed => &[10.0, 5.0],
            LineType::DashDot => &[10.0, 4.0, 2.0, 4.0],
            LineType::Dotted => &[2.0, 4.0],
        }
    }
}

/// Point marker drawn at every data point of a line series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    None,
    Circle,
    Point,
    Square,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Diamond,
    Cross,
    Plus,
    Star,
}

impl Marker {
    pub fn parse(input: &str) -> ChartResult<Self> {
        // single letters are case-sensitive ("D" and "d" are both diamonds)
        match input.trim() {
            "" | "None" | "none" => Ok(Marker::None),
            "o" => Ok(Marker::Circle),
            "." => Ok(Marker::Point),
            "s" => Ok(Marker::Square),
            "^" => Ok(Marker::TriangleUp),
            "v" => Ok(Marker::TriangleDown),
            "<" => Ok(Marker::TriangleLeft),
            ">" => Ok(Marker::TriangleRight),
            "D" | "d" => Ok(Marker::Diamond),
            "x" => Ok(Marker::Cross),
            "+" => Ok(Marker::Plus),
            "*" => Ok(Marker::Star),
            _ => Err(ChartError::invalid_value(format!(
                "unknown marker '{}'",
                input
            ))),
        }
    }
}
