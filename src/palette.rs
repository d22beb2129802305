// Named colors and the default slice palette

use plotters::style::RGBColor;

/// Default color cycle for pie slices when the caller gives none.
pub const DEFAULT_CYCLE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const CYCLE_NAMES: [&str; 10] = [
    "blue", "orange", "green", "red", "purple", "brown", "pink", "gray", "olive", "cyan",
];

const NAMED: &[(&str, RGBColor)] = &[
    ("black", RGBColor(0, 0, 0)),
    ("white", RGBColor(255, 255, 255)),
    ("red", RGBColor(255, 0, 0)),
    ("green", RGBColor(0, 128, 0)),
    ("blue", RGBColor(0, 0, 255)),
    ("yellow", RGBColor(255, 255, 0)),
    ("cyan", RGBColor(0, 255, 255)),
    ("magenta", RGBColor(255, 0, 255)),
    ("orange", RGBColor(255, 165, 0)),
    ("purple", RGBColor(128, 0, 128)),
    ("pink", RGBColor(255, 192, 203)),
    ("brown", RGBColor(165, 42, 42)),
    ("gray", RGBColor(128, 128, 128)),
    ("grey", RGBColor(128, 128, 128)),
    ("lightgray", RGBColor(211, 211, 211)),
    ("lightgrey", RGBColor(211, 211, 211)),
    ("darkgray", RGBColor(169, 169, 169)),
    ("darkgrey", RGBColor(169, 169, 169)),
    ("silver", RGBColor(192, 192, 192)),
    ("navy", RGBColor(0, 0, 128)),
    ("teal", RGBColor(0, 128, 128)),
    ("olive", RGBColor(128, 128, 0)),
    ("maroon", RGBColor(128, 0, 0)),
    ("lime", RGBColor(0, 255, 0)),
    ("gold", RGBColor(255, 215, 0)),
    ("steelblue", RGBColor(70, 130, 180)),
    ("skyblue", RGBColor(135, 206, 235)),
    ("lightblue", RGBColor(173, 216, 230)),
    ("darkblue", RGBColor(0, 0, 139)),
    ("royalblue", RGBColor(65, 105, 225)),
    ("dodgerblue", RGBColor(30, 144, 255)),
    ("cornflowerblue", RGBColor(100, 149, 237)),
    ("midnightblue", RGBColor(25, 25, 112)),
    ("darkgreen", RGBColor(0, 100, 0)),
    ("lightgreen", RGBColor(144, 238, 144)),
    ("forestgreen", RGBColor(34, 139, 34)),
    ("seagreen", RGBColor(46, 139, 87)),
    ("darkred", RGBColor(139, 0, 0)),
    ("firebrick", RGBColor(178, 34, 34)),
    ("crimson", RGBColor(220, 20, 60)),
    ("coral", RGBColor(255, 127, 80)),
    ("salmon", RGBColor(250, 128, 114)),
    ("tomato", RGBColor(255, 99, 71)),
    ("chocolate", RGBColor(210, 105, 30)),
    ("goldenrod", RGBColor(218, 165, 32)),
    ("tan", RGBColor(210, 180, 140)),
    ("khaki", RGBColor(240, 230, 140)),
    ("indigo", RGBColor(75, 0, 130)),
    ("violet", RGBColor(238, 130, 238)),
    ("orchid", RGBColor(218, 112, 214)),
    ("lavender", RGBColor(230, 230, 250)),
    ("turquoise", RGBColor(64, 224, 208)),
    ("slategray", RGBColor(112, 128, 144)),
    ("slategrey", RGBColor(112, 128, 144)),
];

/// Single-letter shorthands.
const SHORTHAND: &[(&str, RGBColor)] = &[
    ("b", RGBColor(0, 0, 255)),
    ("g", RGBColor(0, 128, 0)),
    ("r", RGBColor(255, 0, 0)),
    ("c", RGBColor(0, 191, 191)),
    ("m", RGBColor(191, 0, 191)),
    ("y", RGBColor(191, 191, 0)),
    ("k", RGBColor(0, 0, 0)),
    ("w", RGBColor(255, 255, 255)),
];

/// Look up a color by name (case-insensitive), shorthand letter, or `tab:` palette name.
pub fn lookup(name: &str) -> Option<RGBColor> {
    let name = name.trim();
    if let Some((_, color)) = SHORTHAND.iter().find(|(n, _)| *n == name) {
        return Some(*color);
    }

    let lower = name.to_ascii_lowercase();
    if let Some(entry) = lower.strip_prefix("tab:") {
        return CYCLE_NAMES
            .iter()
            .position(|n| *n == entry || (entry == "grey" && *n == "gray"))
            .map(|idx| DEFAULT_CYCLE[idx]);
    }

    NAMED
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, color)| *color)
}
