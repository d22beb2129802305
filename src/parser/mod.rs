// Parsers for the textual style options of the chart tools

pub mod autopct;
pub mod color;
pub mod stroke;

// Public API re-exports
pub use autopct::PercentFormat;
pub use color::parse_color;
pub use stroke::{LineType, Marker};
