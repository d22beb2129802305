use super::{caption_font, draw_err, fit_label, tick_label_style, value_range, ChartDrawing};
use crate::error::{ChartError, ChartResult};
use crate::ir::BarStyle;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};

/// Share of a category slot covered by its bar
const BAR_WIDTH: f64 = 0.8;

/// One bar per category, in table order.
#[derive(Debug, Clone)]
pub struct BarChart<'a> {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub style: &'a BarStyle,
}

impl<'a> BarChart<'a> {
    pub fn new(categories: Vec<String>, values: Vec<f64>, style: &'a BarStyle) -> ChartResult<Self> {
        if categories.len() != values.len() {
            return Err(ChartError::data_format(format!(
                "Categories and values must have the same length (categories: {}, values: {})",
                categories.len(),
                values.len()
            )));
        }
        if categories.is_empty() {
            return Err(ChartError::data_format("Cannot create bar chart with no data"));
        }
        Ok(Self {
            categories,
            values,
            style,
        })
    }

    fn slot(index: usize) -> (f64, f64) {
        let center = index as f64 + 0.5;
        (center - BAR_WIDTH / 2.0, center + BAR_WIDTH / 2.0)
    }

    fn draw_vertical<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> ChartResult<()> {
        let labels = &self.style.labels;
        let slots = 0.0..self.categories.len() as f64;
        let values = value_range(self.values.iter().copied())?;
        let baseline = values.start;

        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(labels.title.as_str(), caption_font())
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(slots, values)
            .map_err(draw_err("build chart"))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_: &f64| String::new())
            .bold_line_style(BLACK.mix(0.3).stroke_width(1))
            .light_line_style(WHITE.stroke_width(1))
            .x_desc(labels.x_label.as_str())
            .y_desc(labels.y_label.as_str())
            .draw()
            .map_err(draw_err("draw mesh"))?;

        let color = self.style.color;
        chart
            .draw_series(self.values.iter().enumerate().map(|(i, &v)| {
                let (left, right) = Self::slot(i);
                Rectangle::new([(left, 0.0), (right, v)], color.filled())
            }))
            .map_err(draw_err("draw bars"))?;

        // labels are cut to the slot width
        let style = tick_label_style(HPos::Center, VPos::Top);
        let slot_px = chart.backend_coord(&(1.0, baseline)).0 - chart.backend_coord(&(0.0, baseline)).0;
        let max_width = slot_px.max(0) as u32;
        for (i, category) in self.categories.iter().enumerate() {
            let label = fit_label(category, max_width, |text: &str| {
                root.estimate_text_size(text, &style)
                    .map(|(w, _)| w)
                    .map_err(draw_err("measure category label"))
            })?;
            let (x, y) = chart.backend_coord(&(i as f64 + 0.5, baseline));
            root.draw(&Text::new(label, (x, y + 5), style.clone()))
                .map_err(draw_err("draw category label"))?;
        }
        Ok(())
    }

    fn draw_horizontal<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> ChartResult<()> {
        let labels = &self.style.labels;
        let slots = 0.0..self.categories.len() as f64;
        let values = value_range(self.values.iter().copied())?;
        let baseline = values.start;

        // categories run up the y axis, so the caller's x label describes the vertical axis
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(labels.title.as_str(), caption_font())
            .x_label_area_size(50)
            .y_label_area_size(100)
            .build_cartesian_2d(values, slots)
            .map_err(draw_err("build chart"))?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_label_formatter(&|_: &f64| String::new())
            .bold_line_style(BLACK.mix(0.3).stroke_width(1))
            .light_line_style(WHITE.stroke_width(1))
            .x_desc(labels.y_label.as_str())
            .y_desc(labels.x_label.as_str())
            .draw()
            .map_err(draw_err("draw mesh"))?;

        let color = self.style.color;
        chart
            .draw_series(self.values.iter().enumerate().map(|(i, &v)| {
                let (bottom, top) = Self::slot(i);
                Rectangle::new([(0.0, bottom), (v, top)], color.filled())
            }))
            .map_err(draw_err("draw bars"))?;

        let style = tick_label_style(HPos::Right, VPos::Center);
        for (i, category) in self.categories.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(baseline, i as f64 + 0.5));
            let label = fit_label(category, (x - 10).max(0) as u32, |text: &str| {
                root.estimate_text_size(text, &style)
                    .map(|(w, _)| w)
                    .map_err(draw_err("measure category label"))
            })?;
            root.draw(&Text::new(label, (x - 5, y), style.clone()))
                .map_err(draw_err("draw category label"))?;
        }
        Ok(())
    }
}

impl ChartDrawing for BarChart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> ChartResult<()> {
        if self.style.horizontal {
            self.draw_horizontal(root)
        } else {
            self.draw_vertical(root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Labels;

    fn style(horizontal: bool) -> BarStyle {
        let labels = Labels {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
        };
        BarStyle::new(labels, "steelblue", horizontal).unwrap()
    }

    #[test]
    fn test_bar_chart_length_mismatch() {
        let style = style(false);
        let err = BarChart::new(vec!["A".into()], vec![1.0, 2.0], &style).unwrap_err();
        assert!(matches!(err, ChartError::DataFormat(_)));
    }

    #[test]
    fn test_bar_chart_empty() {
        let style = style(true);
        assert!(BarChart::new(vec![], vec![], &style).is_err());
    }

    #[test]
    fn test_slots_are_centered() {
        let (left, right) = BarChart::slot(2);
        assert!((left - 2.1).abs() < 1e-9);
        assert!((right - 2.9).abs() < 1e-9);
    }
}
