//! The four chart tools and their request/response types.
//!
//! Each tool normalizes `data`, renders the chart and answers with either a
//! `data:image/...;base64,...` URI or a `"<ErrorKind>: <description>"` message.
//! Failures never escape as panics or `Err`; they are folded into [`ToolResponse`].

use crate::error::{ChartError, ChartResult};
use crate::ir::{
    BarStyle, ChartSpec, ColumnSelectors, EncodedResult, HistogramStyle, Labels, LineStyle,
    PieStyle, StyleConfig,
};
use crate::normalize::{normalize, RawInput};
use crate::runtime;
use crate::RenderOptions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    BarChart,
    LineChart,
    Histogram,
    PieChart,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::BarChart,
        ToolName::LineChart,
        ToolName::Histogram,
        ToolName::PieChart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::BarChart => "create_bar_chart",
            ToolName::LineChart => "create_line_chart",
            ToolName::Histogram => "create_histogram",
            ToolName::PieChart => "create_pie_chart",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ToolName::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown tool '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BarChartRequest {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub x_column: Option<String>,
    #[serde(default)]
    pub y_column: Option<String>,
    #[serde(default = "default_bar_title")]
    pub title: String,
    #[serde(default = "default_bar_x_label")]
    pub x_label: String,
    #[serde(default = "default_bar_y_label")]
    pub y_label: String,
    #[serde(default = "default_bar_color")]
    pub color: String,
    #[serde(default)]
    pub horizontal: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineChartRequest {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub x_column: Option<String>,
    #[serde(default)]
    pub y_column: Option<String>,
    #[serde(default = "default_line_title")]
    pub title: String,
    #[serde(default = "default_line_x_label")]
    pub x_label: String,
    #[serde(default = "default_line_y_label")]
    pub y_label: String,
    #[serde(default = "default_line_color")]
    pub color: String,
    #[serde(default = "default_line_style")]
    pub line_style: String,
    #[serde(default = "default_marker")]
    pub marker: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistogramRequest {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default = "default_bins")]
    pub bins: usize,
    #[serde(default = "default_histogram_title")]
    pub title: String,
    #[serde(default = "default_histogram_x_label")]
    pub x_label: String,
    #[serde(default = "default_histogram_y_label")]
    pub y_label: String,
    #[serde(default = "default_histogram_color")]
    pub color: String,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PieChartRequest {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub labels_column: Option<String>,
    #[serde(default)]
    pub values_column: Option<String>,
    #[serde(default = "default_pie_title")]
    pub title: String,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default = "default_autopct")]
    pub autopct: String,
    #[serde(default = "default_start_angle")]
    pub startangle: f64,
}

fn default_bar_title() -> String { "Bar Chart".to_string() }
fn default_bar_x_label() -> String { "Categories".to_string() }
fn default_bar_y_label() -> String { "Values".to_string() }
fn default_bar_color() -> String { "steelblue".to_string() }
fn default_line_title() -> String { "Line Chart".to_string() }
fn default_line_x_label() -> String { "X Values".to_string() }
fn default_line_y_label() -> String { "Y Values".to_string() }
fn default_line_color() -> String { "blue".to_string() }
fn default_line_style() -> String { "-".to_string() }
fn default_marker() -> String { "o".to_string() }
fn default_bins() -> usize { 30 }
fn default_histogram_title() -> String { "Histogram".to_string() }
fn default_histogram_x_label() -> String { "Values".to_string() }
fn default_histogram_y_label() -> String { "Frequency".to_string() }
fn default_histogram_color() -> String { "skyblue".to_string() }
fn default_alpha() -> f64 { 0.7 }
fn default_pie_title() -> String { "Pie Chart".to_string() }
fn default_autopct() -> String { "%1.1f%%".to_string() }
fn default_start_angle() -> f64 { 90.0 }

impl BarChartRequest {
    /// Request with every option at its default.
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            x_column: None,
            y_column: None,
            title: default_bar_title(),
            x_label: default_bar_x_label(),
            y_label: default_bar_y_label(),
            color: default_bar_color(),
            horizontal: false,
        }
    }

    pub fn chart_spec(&self) -> ChartResult<ChartSpec> {
        let labels = Labels {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
        };
        Ok(ChartSpec {
            selectors: ColumnSelectors {
                x: self.x_column.clone(),
                y: self.y_column.clone(),
                ..Default::default()
            },
            style: StyleConfig::Bar(BarStyle::new(labels, &self.color, self.horizontal)?),
        })
    }
}

impl LineChartRequest {
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            x_column: None,
            y_column: None,
            title: default_line_title(),
            x_label: default_line_x_label(),
            y_label: default_line_y_label(),
            color: default_line_color(),
            line_style: default_line_style(),
            marker: default_marker(),
        }
    }

    pub fn chart_spec(&self) -> ChartResult<ChartSpec> {
        let labels = Labels {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
        };
        let style = LineStyle::new(labels, &self.color, &self.line_style, &self.marker)?;
        Ok(ChartSpec {
            selectors: ColumnSelectors {
                x: self.x_column.clone(),
                y: self.y_column.clone(),
                ..Default::default()
            },
            style: StyleConfig::Line(style),
        })
    }
}

impl HistogramRequest {
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            column: None,
            bins: default_bins(),
            title: default_histogram_title(),
            x_label: default_histogram_x_label(),
            y_label: default_histogram_y_label(),
            color: default_histogram_color(),
            alpha: default_alpha(),
        }
    }

    pub fn chart_spec(&self) -> ChartResult<ChartSpec> {
        let labels = Labels {
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
        };
        let style = HistogramStyle::new(labels, self.bins, &self.color, self.alpha)?;
        Ok(ChartSpec {
            selectors: ColumnSelectors {
                value: self.column.clone(),
                ..Default::default()
            },
            style: StyleConfig::Histogram(style),
        })
    }
}

impl PieChartRequest {
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            labels_column: None,
            values_column: None,
            title: default_pie_title(),
            colors: None,
            autopct: default_autopct(),
            startangle: default_start_angle(),
        }
    }

    pub fn chart_spec(&self) -> ChartResult<ChartSpec> {
        let colors = self.colors.as_deref().unwrap_or_default();
        let style = PieStyle::new(self.title.clone(), colors, &self.autopct, self.startangle)?;
        Ok(ChartSpec {
            selectors: ColumnSelectors {
                label: self.labels_column.clone(),
                value: self.values_column.clone(),
                ..Default::default()
            },
            style: StyleConfig::Pie(style),
        })
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Outcome of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResponse {
    Image {
        data_uri: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Error {
        message: String,
    },
}

impl ToolResponse {
    /// The text a caller sees: the data URI on success, the tagged message otherwise.
    pub fn text(&self) -> &str {
        match self {
            ToolResponse::Image { data_uri, .. } => data_uri,
            ToolResponse::Error { message } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResponse::Error { .. })
    }

    pub fn data_uri(&self) -> Option<&str> {
        match self {
            ToolResponse::Image { data_uri, .. } => Some(data_uri),
            ToolResponse::Error { .. } => None,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ToolResponse::Image { warnings, .. } => warnings,
            ToolResponse::Error { .. } => &[],
        }
    }
}

impl From<ChartResult<EncodedResult>> for ToolResponse {
    fn from(result: ChartResult<EncodedResult>) -> Self {
        match result {
            Ok(EncodedResult { data_uri, warnings }) => ToolResponse::Image { data_uri, warnings },
            Err(err) => ToolResponse::Error {
                message: err.to_string(),
            },
        }
    }
}

// =============================================================================
// Tools
// =============================================================================

/// Entry point for the chart tools; holds the output settings shared by every call.
#[derive(Debug, Clone, Default)]
pub struct ChartTools {
    options: RenderOptions,
}

impl ChartTools {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    #[tracing::instrument(skip_all, name = "create_bar_chart")]
    pub fn create_bar_chart(&self, request: BarChartRequest) -> ToolResponse {
        let spec = request.chart_spec();
        self.respond(ToolName::BarChart, request.data, spec)
    }

    #[tracing::instrument(skip_all, name = "create_line_chart")]
    pub fn create_line_chart(&self, request: LineChartRequest) -> ToolResponse {
        let spec = request.chart_spec();
        self.respond(ToolName::LineChart, request.data, spec)
    }

    #[tracing::instrument(skip_all, name = "create_histogram")]
    pub fn create_histogram(&self, request: HistogramRequest) -> ToolResponse {
        let spec = request.chart_spec();
        self.respond(ToolName::Histogram, request.data, spec)
    }

    #[tracing::instrument(skip_all, name = "create_pie_chart")]
    pub fn create_pie_chart(&self, request: PieChartRequest) -> ToolResponse {
        let spec = request.chart_spec();
        self.respond(ToolName::PieChart, request.data, spec)
    }

    /// Dispatch a call by tool name with JSON arguments (`{"data": ..., ...}`).
    pub fn call(&self, tool: ToolName, arguments: Value) -> ToolResponse {
        let parsed = match tool {
            ToolName::BarChart => parse_arguments(tool, arguments).map(|r| self.create_bar_chart(r)),
            ToolName::LineChart => {
                parse_arguments(tool, arguments).map(|r| self.create_line_chart(r))
            }
            ToolName::Histogram => parse_arguments(tool, arguments).map(|r| self.create_histogram(r)),
            ToolName::PieChart => parse_arguments(tool, arguments).map(|r| self.create_pie_chart(r)),
        };
        parsed.unwrap_or_else(|err| {
            warn!(tool = %tool, error = %err, "rejected tool arguments");
            ToolResponse::from(ChartResult::<EncodedResult>::Err(err))
        })
    }

    fn respond(&self, tool: ToolName, data: Value, spec: ChartResult<ChartSpec>) -> ToolResponse {
        let result = self.execute(data, spec);
        if let Err(err) = &result {
            warn!(tool = %tool, kind = err.kind(), error = %err, "chart request failed");
        }
        ToolResponse::from(result)
    }

    fn execute(&self, data: Value, spec: ChartResult<ChartSpec>) -> ChartResult<EncodedResult> {
        let table = normalize(RawInput::try_from(data)?)?;
        let spec = spec?;
        runtime::render(&table, &spec, &self.options)
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> ChartResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| ChartError::data_format(format!("invalid arguments for {}: {}", tool, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_name_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
        let err = "create_scatter".parse::<ToolName>().unwrap_err();
        assert!(err.contains("create_bar_chart"));
    }

    #[test]
    fn test_request_defaults() {
        let request: HistogramRequest = serde_json::from_value(json!({"data": [1, 2]})).unwrap();
        assert_eq!(request.bins, 30);
        assert_eq!(request.color, "skyblue");
        assert_eq!(request.alpha, 0.7);

        let request: PieChartRequest = serde_json::from_value(json!({"data": {}})).unwrap();
        assert_eq!(request.autopct, "%1.1f%%");
        assert_eq!(request.startangle, 90.0);
        assert!(request.colors.is_none());
    }

    #[test]
    fn test_new_matches_deserialized_defaults() {
        let built = LineChartRequest::new(json!([1, 2, 3]));
        let parsed: LineChartRequest =
            serde_json::from_value(json!({"data": [1, 2, 3]})).unwrap();
        assert_eq!(built.chart_spec().unwrap(), parsed.chart_spec().unwrap());
        assert_eq!(built.title, parsed.title);
    }

    #[test]
    fn test_call_bad_arguments() {
        let tools = ChartTools::default();
        let response = tools.call(ToolName::Histogram, json!({"data": [1, 2], "bins": "many"}));
        assert!(response.is_error());
        assert!(response.text().starts_with("DataFormatError: invalid arguments for create_histogram"));
    }

    #[test]
    fn test_missing_data_is_data_format_error() {
        let tools = ChartTools::default();
        let response = tools.call(ToolName::BarChart, json!({}));
        assert!(response.text().starts_with("DataFormatError:"));
    }

    #[test]
    fn test_style_error_reported() {
        let tools = ChartTools::default();
        let mut request = BarChartRequest::new(json!({"A": 1, "B": 2}));
        request.color = "not-a-color".into();
        let response = tools.create_bar_chart(request);
        assert!(response.text().starts_with("InvalidValueError:"));
    }

    #[test]
    fn test_response_serialization() {
        let response = ToolResponse::Error {
            message: "EncodingError: x".into(),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "error", "message": "EncodingError: x"})
        );
        let response = ToolResponse::Image {
            data_uri: "data:image/png;base64,AA==".into(),
            warnings: vec![],
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "image", "data_uri": "data:image/png;base64,AA=="})
        );
    }
}
