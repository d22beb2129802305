use crate::error::{ChartError, ChartResult};
use crate::palette;
use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::char,
    combinator::{all_consuming, map, map_res, opt},
    sequence::{preceded, tuple},
    IResult,
};
use plotters::style::RGBColor;

/// Parse a color given as a name, a shorthand letter, or `#rgb` / `#rrggbb` / `#rrggbbaa`.
///
/// The alpha channel of 8-digit hex colors is accepted and ignored.
pub fn parse_color(input: &str) -> ChartResult<RGBColor> {
    let trimmed = input.trim();
    if trimmed.starts_with('#') {
        return all_consuming(hex_color)(trimmed)
            .map(|(_, color)| color)
            .map_err(|_| ChartError::invalid_value(format!("invalid hex color '{}'", input)));
    }

    palette::lookup(trimmed)
        .ok_or_else(|| ChartError::invalid_value(format!("unknown color '{}'", input)))
}

fn hex_color(input: &str) -> IResult<&str, RGBColor> {
    preceded(char('#'), alt((long_hex, short_hex)))(input)
}

/// `rrggbb` with an optional trailing `aa`
fn long_hex(input: &str) -> IResult<&str, RGBColor> {
    map(
        tuple((hex_pair, hex_pair, hex_pair, opt(hex_pair))),
        |(r, g, b, _alpha)| RGBColor(r, g, b),
    )(input)
}

/// `rgb`, each digit doubled
fn short_hex(input: &str) -> IResult<&str, RGBColor> {
    map(tuple((hex_single, hex_single, hex_single)), |(r, g, b)| {
        RGBColor(r * 17, g * 17, b * 17)
    })(input)
}

fn hex_pair(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |s| {
        u8::from_str_radix(s, 16)
    })(input)
}

fn hex_single(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(1, 1, |c: char| c.is_ascii_hexdigit()), |s| {
        u8::from_str_radix(s, 16)
    })(input)
}
