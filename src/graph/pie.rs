use super::{caption_font, draw_err, ChartDrawing};
use crate::error::{ChartError, ChartResult};
use crate::ir::PieStyle;
use crate::palette::DEFAULT_CYCLE;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Largest angular step, in degrees, when tracing a wedge's arc
const ARC_STEP: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

/// Wedges of positive size, drawn counter-clockwise from `style.start_angle`.
#[derive(Debug, Clone)]
pub struct PieChart<'a> {
    pub slices: Vec<Slice>,
    pub style: &'a PieStyle,
}

impl<'a> PieChart<'a> {
    pub fn new(slices: Vec<Slice>, style: &'a PieStyle) -> ChartResult<Self> {
        if slices.is_empty() {
            return Err(ChartError::invalid_value("No positive values to plot"));
        }
        if let Some(slice) = slices.iter().find(|s| !(s.value > 0.0)) {
            return Err(ChartError::invalid_value(format!(
                "slice '{}' has non-positive value {}",
                slice.label, slice.value
            )));
        }
        let total: f64 = slices.iter().map(|s| s.value).sum();
        if !total.is_finite() {
            return Err(ChartError::invalid_value(
                "value range too large to plot (slice total overflows)",
            ));
        }
        Ok(Self { slices, style })
    }

    fn color(&self, index: usize) -> RGBColor {
        let colors: &[RGBColor] = if self.style.colors.is_empty() {
            &DEFAULT_CYCLE
        } else {
            &self.style.colors
        };
        colors[index % colors.len()]
    }

    /// `(start, end)` angles in degrees for every slice.
    fn wedges(&self) -> Vec<(f64, f64)> {
        let total: f64 = self.slices.iter().map(|s| s.value).sum();
        let mut start = self.style.start_angle;
        self.slices
            .iter()
            .map(|slice| {
                let end = start + 360.0 * slice.value / total;
                let wedge = (start, end);
                start = end;
                wedge
            })
            .collect()
    }
}

/// Pixel position at `radius` and `degrees` (counter-clockwise, y grows downward).
fn polar((cx, cy): (i32, i32), radius: f64, degrees: f64) -> (i32, i32) {
    let theta = degrees.to_radians();
    (
        cx + (radius * theta.cos()).round() as i32,
        cy - (radius * theta.sin()).round() as i32,
    )
}

fn wedge_outline(center: (i32, i32), radius: f64, (start, end): (f64, f64)) -> Vec<(i32, i32)> {
    let steps = ((end - start) / ARC_STEP).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for k in 0..=steps {
        let angle = start + (end - start) * k as f64 / steps as f64;
        points.push(polar(center, radius, angle));
    }
    points
}

impl ChartDrawing for PieChart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> ChartResult<()> {
        let area = root
            .titled(self.style.title.as_str(), caption_font())
            .map_err(draw_err("draw title"))?;
        let (width, height) = area.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = width.min(height) as f64 * 0.35;

        let total: f64 = self.slices.iter().map(|s| s.value).sum();
        let wedges = self.wedges();

        for (i, &wedge) in wedges.iter().enumerate() {
            area.draw(&Polygon::new(
                wedge_outline(center, radius, wedge),
                self.color(i).filled(),
            ))
            .map_err(draw_err("draw wedge"))?;
        }

        for (slice, &(start, end)) in self.slices.iter().zip(&wedges) {
            let middle = (start + end) / 2.0;
            let h = if middle.to_radians().cos() >= 0.0 {
                HPos::Left
            } else {
                HPos::Right
            };
            let style = ("sans-serif", 16)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(h, VPos::Center));
            area.draw(&Text::new(
                slice.label.clone(),
                polar(center, radius * 1.1, middle),
                style,
            ))
            .map_err(draw_err("draw slice label"))?;

            if let Some(autopct) = &self.style.autopct {
                let style = ("sans-serif", 14)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                area.draw(&Text::new(
                    autopct.format(100.0 * slice.value / total),
                    polar(center, radius * 0.6, middle),
                    style,
                ))
                .map_err(draw_err("draw percentage"))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(colors: &[&str]) -> PieStyle {
        let colors: Vec<String> = colors.iter().map(|c| c.to_string()).collect();
        PieStyle::new("Pie".into(), &colors, "%1.1f%%", 90.0).unwrap()
    }

    fn slices(values: &[f64]) -> Vec<Slice> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Slice {
                label: format!("S{}", i),
                value,
            })
            .collect()
    }

    #[test]
    fn test_wedges_cover_full_circle_from_start_angle() {
        let style = style(&[]);
        let pie = PieChart::new(slices(&[1.0, 1.0, 2.0]), &style).unwrap();
        let wedges = pie.wedges();
        assert_eq!(wedges[0], (90.0, 180.0));
        assert_eq!(wedges[1], (180.0, 270.0));
        assert_eq!(wedges[2], (270.0, 450.0));
    }

    #[test]
    fn test_colors_cycle() {
        let style = style(&["red", "blue"]);
        let pie = PieChart::new(slices(&[1.0, 1.0, 1.0]), &style).unwrap();
        assert_eq!(pie.color(2), RGBColor(255, 0, 0));

        let style = self::style(&[]);
        let pie = PieChart::new(slices(&[1.0]), &style).unwrap();
        assert_eq!(pie.color(11), DEFAULT_CYCLE[1]);
    }

    #[test]
    fn test_non_positive_slices_rejected() {
        let style = style(&[]);
        assert!(PieChart::new(slices(&[]), &style).is_err());
        assert!(PieChart::new(slices(&[1.0, 0.0]), &style).is_err());
    }

    #[test]
    fn test_overflowing_total_rejected() {
        let style = style(&[]);
        let err = PieChart::new(slices(&[1.7e308, 1.7e308]), &style).unwrap_err();
        assert!(matches!(err, ChartError::InvalidValue(_)));
    }

    #[test]
    fn test_polar_counter_clockwise() {
        assert_eq!(polar((100, 100), 10.0, 90.0), (100, 90));
        assert_eq!(polar((100, 100), 10.0, 180.0), (90, 100));
    }

    #[test]
    fn test_wedge_outline_starts_at_center() {
        let outline = wedge_outline((0, 0), 10.0, (0.0, 90.0));
        assert_eq!(outline[0], (0, 0));
        assert_eq!(outline[1], (10, 0));
        assert_eq!(*outline.last().unwrap(), (0, -10));
        assert_eq!(outline.len(), 92);
    }
}
