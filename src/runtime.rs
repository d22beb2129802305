// Runtime executor: Table + ChartSpec -> encoded image

use crate::data::{ColumnValues, Table};
use crate::encode;
use crate::error::{ChartError, ChartResult};
use crate::graph::{self, BarChart, HistogramChart, LineChart, PieChart, Slice, XAxis};
use crate::ir::{ChartSpec, EncodedResult, PieStyle, StyleConfig};
use crate::resolve::{resolve_column, resolve_distribution_column, Role, Source};
use crate::RenderOptions;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Render a [`ChartSpec`] against a normalized table.
#[tracing::instrument(skip_all, fields(kind = %spec.kind()))]
pub fn render(
    table: &Table,
    spec: &ChartSpec,
    options: &RenderOptions,
) -> ChartResult<EncodedResult> {
    let selectors = &spec.selectors;
    let mut warnings = Vec::new();

    let image = match &spec.style {
        StyleConfig::Bar(style) => {
            let x = resolve_column(table, Role::X, selectors.get(Role::X))?;
            let y = resolve_column(table, Role::Y, selectors.get(Role::Y))?;
            let chart = BarChart::new(category_labels(x, table), numeric(y, table)?, style)?;
            graph::rasterize(&chart, options)?
        }
        StyleConfig::Line(style) => {
            let x = resolve_column(table, Role::X, selectors.get(Role::X))?;
            let y = resolve_column(table, Role::Y, selectors.get(Role::Y))?;
            let chart = LineChart::new(x_axis(x, table), numeric(y, table)?, style)?;
            graph::rasterize(&chart, options)?
        }
        StyleConfig::Histogram(style) => {
            let column = resolve_distribution_column(table, selectors.get(Role::Value))?;
            debug!(column = %column.name, bins = style.bins, "binning values");
            let chart = HistogramChart::new(column.numbers()?, style)?;
            graph::rasterize(&chart, options)?
        }
        StyleConfig::Pie(style) => {
            let labels = resolve_column(table, Role::Label, selectors.get(Role::Label))?;
            let values = resolve_column(table, Role::Value, selectors.get(Role::Value))?;
            let slices = aggregate_slices(&pie_labels(labels, table), &numeric(values, table)?);
            let chart = pie_chart(slices, style, &mut warnings)?;
            graph::rasterize(&chart, options)?
        }
    };

    let data_uri = encode::to_data_uri(&image)?;
    info!(
        width = image.width,
        height = image.height,
        bytes = image.bytes.len(),
        "chart rendered"
    );

    Ok(EncodedResult { data_uri, warnings })
}

fn numeric(source: Source<'_>, table: &Table) -> ChartResult<Vec<f64>> {
    match source {
        Source::Column(column) => Ok(column.numbers()?.to_vec()),
        Source::RowIndex => Ok(row_positions(table)),
    }
}

fn row_positions(table: &Table) -> Vec<f64> {
    (0..table.row_count()).map(|i| i as f64).collect()
}

fn category_labels(source: Source<'_>, table: &Table) -> Vec<String> {
    match source {
        Source::Column(column) => column.labels(),
        Source::RowIndex => (0..table.row_count()).map(|i| i.to_string()).collect(),
    }
}

fn pie_labels(source: Source<'_>, table: &Table) -> Vec<String> {
    match source {
        Source::Column(column) => column.labels(),
        Source::RowIndex => (1..=table.row_count())
            .map(|i| format!("Category {}", i))
            .collect(),
    }
}

fn x_axis(source: Source<'_>, table: &Table) -> XAxis {
    match source {
        Source::Column(column) => match &column.values {
            ColumnValues::Numeric(values) => XAxis::Continuous(values.clone()),
            ColumnValues::Text(values) => XAxis::Categorical(values.clone()),
        },
        Source::RowIndex => XAxis::Continuous(row_positions(table)),
    }
}

/// Merge slices sharing a label by summation, keeping first-seen order.
fn aggregate_slices(labels: &[String], values: &[f64]) -> Vec<Slice> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for (label, &value) in labels.iter().zip(values) {
        if !totals.contains_key(label.as_str()) {
            order.push(label.as_str());
        }
        *totals.entry(label.as_str()).or_insert(0.0) += value;
    }

    order
        .into_iter()
        .map(|label| Slice {
            label: label.to_string(),
            value: totals.get(label).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Drop non-positive slices (recording a warning for each) and build the pie.
fn pie_chart<'a>(
    slices: Vec<Slice>,
    style: &'a PieStyle,
    warnings: &mut Vec<String>,
) -> ChartResult<PieChart<'a>> {
    let (kept, dropped): (Vec<Slice>, Vec<Slice>) =
        slices.into_iter().partition(|slice| slice.value > 0.0);

    for slice in &dropped {
        let message = format!(
            "slice '{}' excluded: non-positive value {}",
            slice.label, slice.value
        );
        warn!("{}", message);
        warnings.push(message);
    }

    if kept.is_empty() {
        return Err(ChartError::invalid_value(
            "No positive values to plot in pie chart",
        ));
    }
    PieChart::new(kept, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, Scalar};
    use crate::encode::decode_data_uri;
    use crate::ir::{BarStyle, ColumnSelectors, HistogramStyle, Labels, LineStyle};

    fn labels() -> Labels {
        Labels {
            title: "Chart".into(),
            x_label: "X".into(),
            y_label: "Y".into(),
        }
    }

    fn sales() -> Table {
        Table::new(vec![
            Column::text("category", vec!["A".into(), "B".into(), "C".into()]),
            Column::numeric("value", vec![10.0, 20.0, 15.0]),
        ])
        .unwrap()
    }

    fn bar_spec(selectors: ColumnSelectors) -> ChartSpec {
        ChartSpec {
            selectors,
            style: StyleConfig::Bar(BarStyle::new(labels(), "steelblue", false).unwrap()),
        }
    }

    fn pie_spec() -> ChartSpec {
        ChartSpec {
            selectors: ColumnSelectors::default(),
            style: StyleConfig::Pie(PieStyle::new("Pie".into(), &[], "%1.1f%%", 90.0).unwrap()),
        }
    }

    #[test]
    fn test_render_bar_png() {
        let result = render(&sales(), &bar_spec(ColumnSelectors::default()), &RenderOptions::default())
            .unwrap();
        assert!(result.data_uri.starts_with("data:image/png;base64,"));
        assert!(result.warnings.is_empty());
        let (mime, bytes) = decode_data_uri(&result.data_uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_render_bar_text_values_rejected() {
        let selectors = ColumnSelectors {
            y: Some("category".into()),
            ..Default::default()
        };
        let err = render(&sales(), &bar_spec(selectors), &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, ChartError::InvalidValue(_)));
    }

    #[test]
    fn test_render_line_categorical_x() {
        let spec = ChartSpec {
            selectors: ColumnSelectors::default(),
            style: StyleConfig::Line(LineStyle::new(labels(), "blue", "--", "s").unwrap()),
        };
        let result = render(&sales(), &spec, &RenderOptions::default()).unwrap();
        assert!(result.data_uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_render_histogram_anonymous() {
        let cells = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0, 3.0, 6.0]
            .iter()
            .map(|&n| Scalar::Number(n))
            .collect();
        let table = Table::anonymous(cells).unwrap();
        let spec = ChartSpec {
            selectors: ColumnSelectors::default(),
            style: StyleConfig::Histogram(HistogramStyle::new(labels(), 5, "skyblue", 0.7).unwrap()),
        };
        assert!(render(&table, &spec, &RenderOptions::default()).is_ok());
    }

    #[test]
    fn test_render_svg() {
        let options = RenderOptions {
            format: crate::OutputFormat::Svg,
            ..Default::default()
        };
        let result = render(&sales(), &pie_spec(), &options).unwrap();
        assert!(result.data_uri.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_aggregate_slices_merges_in_first_seen_order() {
        let labels = vec!["B".to_string(), "A".to_string(), "B".to_string()];
        let slices = aggregate_slices(&labels, &[1.0, 2.0, 3.0]);
        assert_eq!(
            slices,
            vec![
                Slice { label: "B".into(), value: 4.0 },
                Slice { label: "A".into(), value: 2.0 },
            ]
        );
    }

    #[test]
    fn test_pie_non_positive_slice_warns() {
        let table = Table::new(vec![
            Column::text("label", vec!["A".into(), "B".into(), "C".into()]),
            Column::numeric("value", vec![10.0, -5.0, 15.0]),
        ])
        .unwrap();
        let result = render(&table, &pie_spec(), &RenderOptions::default()).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("'B'"));
    }

    #[test]
    fn test_pie_all_non_positive_fails() {
        let table = Table::new(vec![
            Column::text("label", vec!["A".into(), "B".into()]),
            Column::numeric("value", vec![0.0, -1.0]),
        ])
        .unwrap();
        let err = render(&table, &pie_spec(), &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, ChartError::InvalidValue(_)));
        assert_eq!(graph::live_canvases(), 0);
    }

    #[test]
    fn test_pie_anonymous_labels() {
        let table = Table::anonymous(vec![Scalar::Number(3.0), Scalar::Number(1.0)]).unwrap();
        let source = resolve_column(&table, Role::Label, None).unwrap();
        let labels = pie_labels(source, &table);
        assert_eq!(labels, vec!["Category 1", "Category 2"]);
    }
}
