// Rendering surface shared by every chart kind

pub mod bar;
pub mod histogram;
pub mod line;
pub mod pie;

use crate::error::{ChartError, ChartResult};
use crate::{OutputFormat, RenderOptions, MAX_DIMENSION};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::cell::Cell;
use std::fmt;
use std::ops::Range;
use tracing::trace;

pub use bar::BarChart;
pub use histogram::HistogramChart;
pub use line::{LineChart, XAxis};
pub use pie::{PieChart, Slice};

/// Something that can paint itself onto a drawing area.
pub trait ChartDrawing {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> ChartResult<()>;
}

/// Encoded image bytes plus what they are.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

thread_local! {
    static LIVE_CANVASES: Cell<usize> = Cell::new(0);
}

/// Number of canvases currently alive on this thread.
pub fn live_canvases() -> usize {
    LIVE_CANVASES.with(|n| n.get())
}

enum Surface {
    Raster(Vec<u8>),
    Vector(String),
}

/// One request's drawing surface. Released on drop, whether or not drawing succeeded.
pub struct Canvas {
    surface: Surface,
    width: u32,
    height: u32,
    format: OutputFormat,
}

impl Canvas {
    pub fn acquire(options: &RenderOptions) -> ChartResult<Self> {
        let (width, height) = (options.width, options.height);
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ChartError::encoding(format!(
                "image size {}x{} is outside 1..={} pixels",
                width, height, MAX_DIMENSION
            )));
        }

        let surface = match options.format {
            OutputFormat::Png => Surface::Raster(vec![0u8; (width * height * 3) as usize]),
            OutputFormat::Svg => Surface::Vector(String::new()),
        };

        LIVE_CANVASES.with(|n| n.set(n.get() + 1));
        trace!(width, height, format = ?options.format, "canvas acquired");

        Ok(Canvas {
            surface,
            width,
            height,
            format: options.format,
        })
    }

    pub fn paint<C: ChartDrawing>(&mut self, chart: &C) -> ChartResult<()> {
        let size = (self.width, self.height);
        match &mut self.surface {
            Surface::Raster(buffer) => {
                let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
                paint_on(&root, chart)
            }
            Surface::Vector(svg) => {
                let root = SVGBackend::with_string(svg, size).into_drawing_area();
                paint_on(&root, chart)
            }
        }
    }

    /// Finalize the canvas into image bytes
    pub fn encode(&self) -> ChartResult<RenderedImage> {
        let bytes = match &self.surface {
            Surface::Raster(buffer) => {
                let mut png_bytes = Vec::new();
                image::codecs::png::PngEncoder::new(&mut png_bytes)
                    .write_image(buffer, self.width, self.height, image::ColorType::Rgb8)
                    .map_err(|e| ChartError::encoding(format!("failed to encode PNG: {}", e)))?;
                png_bytes
            }
            Surface::Vector(svg) => svg.clone().into_bytes(),
        };

        Ok(RenderedImage {
            bytes,
            format: self.format,
            width: self.width,
            height: self.height,
        })
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        LIVE_CANVASES.with(|n| n.set(n.get().saturating_sub(1)));
        trace!("canvas released");
    }
}

fn paint_on<DB: DrawingBackend, C: ChartDrawing>(
    root: &DrawingArea<DB, Shift>,
    chart: &C,
) -> ChartResult<()> {
    root.fill(&WHITE).map_err(draw_err("fill background"))?;
    chart.draw(root)?;
    root.present().map_err(draw_err("present drawing"))
}

/// Draw `chart` on a fresh canvas and encode it.
pub fn rasterize<C: ChartDrawing>(chart: &C, options: &RenderOptions) -> ChartResult<RenderedImage> {
    let mut canvas = Canvas::acquire(options)?;
    canvas.paint(chart)?;
    canvas.encode()
}

/// Adapter for plotters errors: `.map_err(draw_err("draw bars"))`.
pub(crate) fn draw_err<E: fmt::Display>(what: &'static str) -> impl FnOnce(E) -> ChartError {
    move |e| ChartError::encoding(format!("failed to {}: {}", what, e))
}

/// Data range with 5% padding on both ends; a degenerate range is widened by
/// one unit, or by 5% of the value when that is larger.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> ChartResult<Range<f64>> {
    let (min, max) = bounds(values);
    let padding = if min == max {
        (min.abs() * 0.05).max(1.0)
    } else {
        (max - min) * 0.05
    };
    plottable((min - padding)..(max + padding))
}

/// Value axis for bars: always contains zero, padded away from it.
pub(crate) fn value_range(values: impl IntoIterator<Item = f64>) -> ChartResult<Range<f64>> {
    let (min, max) = bounds(values);
    let (lo, hi) = (min.min(0.0), max.max(0.0));
    if lo == hi {
        return Ok(0.0..1.0);
    }
    let padding = (hi - lo) * 0.05;
    let lo = if lo < 0.0 { lo - padding } else { lo };
    let hi = if hi > 0.0 { hi + padding } else { hi };
    plottable(lo..hi)
}

/// Axis ranges must have finite ends and a finite, non-zero span; plotters
/// cannot lay out ticks for anything else.
pub(crate) fn plottable(range: Range<f64>) -> ChartResult<Range<f64>> {
    let span = range.end - range.start;
    if range.start.is_finite() && range.end.is_finite() && span.is_finite() && span > 0.0 {
        Ok(range)
    } else {
        Err(ChartError::invalid_value(format!(
            "value range too large to plot ({} to {})",
            range.start, range.end
        )))
    }
}

fn bounds(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}

pub(crate) fn caption_font() -> (&'static str, u32) {
    ("sans-serif", 24)
}

/// Shorten `text` with a trailing "..." until `measure` says it fits in `max_width`.
/// Returns an empty string when not even the ellipsis fits.
pub(crate) fn fit_label(
    text: &str,
    max_width: u32,
    measure: impl Fn(&str) -> ChartResult<u32>,
) -> ChartResult<String> {
    if measure(text)? <= max_width {
        return Ok(text.to_string());
    }
    let chars: Vec<char> = text.chars().collect();
    for keep in (0..chars.len()).rev() {
        let candidate: String = chars[..keep].iter().chain(['.', '.', '.'].iter()).collect();
        if measure(&candidate)? <= max_width {
            return Ok(candidate);
        }
    }
    Ok(String::new())
}

/// Text style for hand-placed category labels.
pub(crate) fn tick_label_style(h: HPos, v: VPos) -> TextStyle<'static> {
    ("sans-serif", 14).into_font().color(&BLACK).pos(Pos::new(h, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    struct Broken;

    impl ChartDrawing for Broken {
        fn draw<DB: DrawingBackend>(&self, _root: &DrawingArea<DB, Shift>) -> ChartResult<()> {
            Err(ChartError::encoding("broken"))
        }
    }

    struct Blank;

    impl ChartDrawing for Blank {
        fn draw<DB: DrawingBackend>(&self, _root: &DrawingArea<DB, Shift>) -> ChartResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_canvas_released_after_failure() {
        let before = live_canvases();
        let err = rasterize(&Broken, &RenderOptions::default()).unwrap_err();
        assert_eq!(err, ChartError::encoding("broken"));
        assert_eq!(live_canvases(), before);
    }

    #[test]
    fn test_blank_png_has_requested_size() {
        let options = RenderOptions {
            width: 40,
            height: 30,
            format: OutputFormat::Png,
        };
        let image = rasterize(&Blank, &options).unwrap();
        assert_eq!(&image.bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
        let decoded = image::load_from_memory(&image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
        assert_eq!(live_canvases(), 0);
    }

    #[test]
    fn test_blank_svg_is_text() {
        let options = RenderOptions {
            width: 40,
            height: 30,
            format: OutputFormat::Svg,
        };
        let image = rasterize(&Blank, &options).unwrap();
        let text = String::from_utf8(image.bytes).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    fn test_zero_or_oversized_dimensions_rejected() {
        for (width, height) in [(0, 600), (800, 0), (MAX_DIMENSION + 1, 600)] {
            let options = RenderOptions {
                width,
                height,
                format: OutputFormat::Png,
            };
            assert!(matches!(
                Canvas::acquire(&options),
                Err(ChartError::Encoding(_))
            ));
        }
        assert_eq!(live_canvases(), 0);
    }

    #[test]
    fn test_value_range_includes_zero() {
        let range = value_range([3.0, 5.0]).unwrap();
        assert_eq!(range.start, 0.0);
        assert!(range.end > 5.0);
        let range = value_range([-2.0, -1.0]).unwrap();
        assert!(range.start < -2.0);
        assert_eq!(range.end, 0.0);
        assert_eq!(value_range([0.0]).unwrap(), 0.0..1.0);
    }

    #[test]
    fn test_padded_range_degenerate() {
        assert_eq!(padded_range([2.0, 2.0]).unwrap(), 1.0..3.0);
        let range = padded_range([0.0, 10.0]).unwrap();
        assert_eq!(range, -0.5..10.5);
        let range = padded_range([1e300, 1e300]).unwrap();
        assert!(range.start < 1e300 && range.end > 1e300);
    }

    #[test]
    fn test_overflowing_span_rejected() {
        let huge = [-1.7e308, 1.7e308];
        assert!(matches!(padded_range(huge), Err(ChartError::InvalidValue(_))));
        assert!(matches!(value_range(huge), Err(ChartError::InvalidValue(_))));
        // span fits, but the padding pushes the end past f64::MAX
        assert!(matches!(
            padded_range([0.0, f64::MAX]),
            Err(ChartError::InvalidValue(_))
        ));
        let err = value_range([1.0, 1.79e308]).unwrap_err();
        assert!(err.to_string().contains("value range too large to plot"));
    }

    #[test]
    fn test_fit_label_truncates() {
        // one pixel per character
        let measure = |s: &str| -> ChartResult<u32> { Ok(s.chars().count() as u32) };
        assert_eq!(fit_label("short", 10, measure).unwrap(), "short");
        assert_eq!(fit_label("a very long label", 8, measure).unwrap(), "a ver...");
        assert_eq!(fit_label("abc", 2, measure).unwrap(), "");
    }
}
