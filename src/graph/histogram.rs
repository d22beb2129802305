use super::{caption_font, draw_err, padded_range, plottable, ChartDrawing};
use crate::error::{ChartError, ChartResult};
use crate::ir::{HistogramStyle, MAX_BINS};
use plotters::coord::Shift;
use plotters::prelude::*;

/// Equal-width buckets: `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Bucket `values` into `bins` equal-width bins spanning `[min, max]`.
///
/// Every bucket is half-open except the last, which also takes `max`. When all
/// values are equal the span is `[v - 0.5, v + 0.5]` (wider for values too
/// large for a half unit to register).
pub fn bin_values(values: &[f64], bins: usize) -> ChartResult<Bins> {
    if values.is_empty() {
        return Err(ChartError::data_format("Cannot create histogram with no data"));
    }
    if bins == 0 || bins > MAX_BINS {
        return Err(ChartError::invalid_value(format!(
            "bins must be between 1 and {}, got {}",
            MAX_BINS, bins
        )));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min != max {
        (min, max)
    } else if min - 0.5 < max + 0.5 {
        (min - 0.5, max + 0.5)
    } else {
        let half = min.abs() * 0.05;
        (min - half, max + half)
    };
    let span = plottable(lo..hi)?;
    let (lo, hi) = (span.start, span.end);
    let width = (hi - lo) / bins as f64;
    if width <= 0.0 {
        return Err(ChartError::invalid_value(format!(
            "value range {} to {} is too narrow for {} bins",
            lo, hi, bins
        )));
    }

    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for &v in values {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    Ok(Bins { edges, counts })
}

#[derive(Debug, Clone)]
pub struct HistogramChart<'a> {
    pub bins: Bins,
    pub style: &'a HistogramStyle,
}

impl<'a> HistogramChart<'a> {
    pub fn new(values: &[f64], style: &'a HistogramStyle) -> ChartResult<Self> {
        Ok(Self {
            bins: bin_values(values, style.bins)?,
            style,
        })
    }
}

impl ChartDrawing for HistogramChart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> ChartResult<()> {
        let labels = &self.style.labels;
        let edges = &self.bins.edges;
        let tallest = self.bins.counts.iter().copied().max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(labels.title.as_str(), caption_font())
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(padded_range(edges.iter().copied())?, 0.0..tallest * 1.05)
            .map_err(draw_err("build chart"))?;

        chart
            .configure_mesh()
            .bold_line_style(BLACK.mix(0.3).stroke_width(1))
            .light_line_style(WHITE.stroke_width(1))
            .x_desc(labels.x_label.as_str())
            .y_desc(labels.y_label.as_str())
            .draw()
            .map_err(draw_err("draw mesh"))?;

        let bars: Vec<[(f64, f64); 2]> = self
            .bins
            .counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(i, &count)| [(edges[i], 0.0), (edges[i + 1], count as f64)])
            .collect();

        let fill = self.style.color.mix(self.style.alpha).filled();
        chart
            .draw_series(bars.iter().map(|&corners| Rectangle::new(corners, fill)))
            .map_err(draw_err("draw bins"))?;
        chart
            .draw_series(bars.iter().map(|&corners| Rectangle::new(corners, BLACK.stroke_width(1))))
            .map_err(draw_err("draw bin outlines"))?;
        Ok(())
    }
}
