use super::{caption_font, draw_err, fit_label, padded_range, tick_label_style, ChartDrawing};
use crate::error::{ChartError, ChartResult};
use crate::ir::LineStyle;
use crate::parser::{LineType, Marker};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};

const LINE_WIDTH: u32 = 2;
const MARKER_SIZE: i32 = 4;

/// Horizontal positions of a line series.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    /// Numeric x values on a continuous axis
    Continuous(Vec<f64>),
    /// Text x values, evenly spaced in row order
    Categorical(Vec<String>),
}

impl XAxis {
    fn len(&self) -> usize {
        match self {
            XAxis::Continuous(v) => v.len(),
            XAxis::Categorical(v) => v.len(),
        }
    }

    fn positions(&self) -> Vec<f64> {
        match self {
            XAxis::Continuous(v) => v.clone(),
            XAxis::Categorical(v) => (0..v.len()).map(|i| i as f64).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineChart<'a> {
    pub x: XAxis,
    pub y: Vec<f64>,
    pub style: &'a LineStyle,
}

impl<'a> LineChart<'a> {
    pub fn new(x: XAxis, y: Vec<f64>, style: &'a LineStyle) -> ChartResult<Self> {
        if x.len() != y.len() {
            return Err(ChartError::data_format(format!(
                "X and Y data must have the same length (x: {}, y: {})",
                x.len(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(ChartError::data_format("Cannot create line chart with no data"));
        }
        Ok(Self { x, y, style })
    }
}

impl ChartDrawing for LineChart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> ChartResult<()> {
        let labels = &self.style.labels;
        let xs = self.x.positions();
        let x_range = match &self.x {
            XAxis::Continuous(_) => padded_range(xs.iter().copied())?,
            XAxis::Categorical(names) => -0.5..(names.len() as f64 - 0.5),
        };
        let y_range = padded_range(self.y.iter().copied())?;
        let baseline = y_range.start;

        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(labels.title.as_str(), caption_font())
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err("build chart"))?;

        let categorical = matches!(self.x, XAxis::Categorical(_));
        let blank = |_: &f64| String::new();
        let mut mesh = chart.configure_mesh();
        mesh.bold_line_style(BLACK.mix(0.3).stroke_width(1))
            .light_line_style(WHITE.stroke_width(1))
            .x_desc(labels.x_label.as_str())
            .y_desc(labels.y_label.as_str());
        if categorical {
            mesh.disable_x_mesh().x_label_formatter(&blank);
        }
        mesh.draw().map_err(draw_err("draw mesh"))?;

        if let XAxis::Categorical(names) = &self.x {
            let style = tick_label_style(HPos::Center, VPos::Top);
            let step = chart.backend_coord(&(1.0, baseline)).0 - chart.backend_coord(&(0.0, baseline)).0;
            let max_width = step.max(0) as u32;
            for (i, name) in names.iter().enumerate() {
                let label = fit_label(name, max_width, |text: &str| {
                    root.estimate_text_size(text, &style)
                        .map(|(w, _)| w)
                        .map_err(draw_err("measure category label"))
                })?;
                let (x, y) = chart.backend_coord(&(i as f64, baseline));
                root.draw(&Text::new(label, (x, y + 5), style.clone()))
                    .map_err(draw_err("draw category label"))?;
            }
        }

        let pixels: Vec<(i32, i32)> = xs
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| chart.backend_coord(&(x, y)))
            .collect();
        let color = self.style.color;

        if self.style.line_type != LineType::None {
            for segment in dash_segments(&pixels, self.style.line_type.dash_pattern()) {
                root.draw(&PathElement::new(segment, color.stroke_width(LINE_WIDTH)))
                    .map_err(draw_err("draw line"))?;
            }
        }

        for &point in &pixels {
            draw_marker(root, self.style.marker, point, color)?;
        }
        Ok(())
    }
}

/// Split a polyline into the visible pieces of a dash pattern (on, off, on, off, ...).
/// An empty pattern keeps the polyline whole.
pub(crate) fn dash_segments(points: &[(i32, i32)], pattern: &[f64]) -> Vec<Vec<(i32, i32)>> {
    if points.len() < 2 {
        return Vec::new();
    }
    if pattern.is_empty() {
        return vec![points.to_vec()];
    }

    let mut segments = Vec::new();
    let mut current: Vec<(i32, i32)> = Vec::new();
    let mut phase = 0;
    let mut remaining = pattern[0];

    for pair in points.windows(2) {
        let (x0, y0) = (pair[0].0 as f64, pair[0].1 as f64);
        let (x1, y1) = (pair[1].0 as f64, pair[1].1 as f64);
        let length = (x1 - x0).hypot(y1 - y0);
        if length == 0.0 {
            continue;
        }
        let at = |t: f64| {
            let f = t / length;
            (
                (x0 + (x1 - x0) * f).round() as i32,
                (y0 + (y1 - y0) * f).round() as i32,
            )
        };

        let mut t = 0.0;
        while t < length {
            let step = remaining.min(length - t);
            let on = phase % 2 == 0;
            if on {
                if current.is_empty() {
                    current.push(at(t));
                }
                current.push(at(t + step));
            }
            t += step;
            remaining -= step;

            if remaining <= 1e-9 {
                if on && current.len() >= 2 {
                    segments.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                phase = (phase + 1) % pattern.len();
                remaining = pattern[phase];
            }
        }
    }

    if current.len() >= 2 {
        segments.push(current);
    }
    segments
}

fn draw_marker<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    marker: Marker,
    (x, y): (i32, i32),
    color: RGBColor,
) -> ChartResult<()> {
    let s = MARKER_SIZE;
    let fill = color.filled();
    let stroke = color.stroke_width(2);

    let result = match marker {
        Marker::None => return Ok(()),
        Marker::Circle => root.draw(&Circle::new((x, y), s, fill)),
        Marker::Point => root.draw(&Circle::new((x, y), s / 2, fill)),
        Marker::Square => root.draw(&Rectangle::new([(x - s, y - s), (x + s, y + s)], fill)),
        Marker::TriangleUp => root.draw(&Polygon::new(
            vec![(x, y - s), (x - s, y + s), (x + s, y + s)],
            fill,
        )),
        Marker::TriangleDown => root.draw(&Polygon::new(
            vec![(x, y + s), (x - s, y - s), (x + s, y - s)],
            fill,
        )),
        Marker::TriangleLeft => root.draw(&Polygon::new(
            vec![(x - s, y), (x + s, y - s), (x + s, y + s)],
            fill,
        )),
        Marker::TriangleRight => root.draw(&Polygon::new(
            vec![(x + s, y), (x - s, y - s), (x - s, y + s)],
            fill,
        )),
        Marker::Diamond => root.draw(&Polygon::new(
            vec![(x, y - s), (x + s, y), (x, y + s), (x - s, y)],
            fill,
        )),
        Marker::Cross => root
            .draw(&PathElement::new(vec![(x - s, y - s), (x + s, y + s)], stroke))
            .and_then(|_| root.draw(&PathElement::new(vec![(x - s, y + s), (x + s, y - s)], stroke))),
        Marker::Plus => root
            .draw(&PathElement::new(vec![(x - s, y), (x + s, y)], stroke))
            .and_then(|_| root.draw(&PathElement::new(vec![(x, y - s), (x, y + s)], stroke))),
        Marker::Star => root.draw(&Polygon::new(star_points((x, y), s + 1), fill)),
    };
    result.map_err(draw_err("draw marker"))
}

/// Five-pointed star, first point straight up.
fn star_points((x, y): (i32, i32), radius: i32) -> Vec<(i32, i32)> {
    let outer = radius as f64;
    let inner = outer * 0.4;
    (0..10)
        .map(|k| {
            let r = if k % 2 == 0 { outer } else { inner };
            let theta = std::f64::consts::FRAC_PI_2 + k as f64 * std::f64::consts::PI / 5.0;
            (
                x + (r * theta.cos()).round() as i32,
                y - (r * theta.sin()).round() as i32,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_segments_split_straight_line() {
        let segments = dash_segments(&[(0, 0), (30, 0)], &[10.0, 5.0]);
        assert_eq!(segments, vec![vec![(0, 0), (10, 0)], vec![(15, 0), (25, 0)]]);
    }

    #[test]
    fn test_dash_continues_across_vertices() {
        let segments = dash_segments(&[(0, 0), (4, 0), (4, 4)], &[6.0, 100.0]);
        assert_eq!(segments, vec![vec![(0, 0), (4, 0), (4, 2)]]);
    }

    #[test]
    fn test_solid_pattern_keeps_polyline() {
        let points = vec![(0, 0), (5, 5), (10, 0)];
        assert_eq!(dash_segments(&points, &[]), vec![points.clone()]);
    }

    #[test]
    fn test_single_point_has_no_segments() {
        assert!(dash_segments(&[(3, 3)], &[]).is_empty());
    }

    #[test]
    fn test_star_has_ten_vertices() {
        let points = star_points((10, 10), 5);
        assert_eq!(points.len(), 10);
        assert_eq!(points[0], (10, 5));
    }

    #[test]
    fn test_categorical_positions() {
        let axis = XAxis::Categorical(vec!["Jan".into(), "Feb".into(), "Mar".into()]);
        assert_eq!(axis.positions(), vec![0.0, 1.0, 2.0]);
    }
}
