use crate::error::{ChartError, ChartResult};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, map_res, opt, value},
    multi::{many0, many1},
    sequence::{preceded, tuple},
    IResult,
};

/// printf-style format applied to a slice percentage, e.g. `%1.1f%%`.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentFormat {
    pieces: Vec<Piece>,
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    Value(Conversion),
}

#[derive(Debug, Clone, PartialEq)]
struct Conversion {
    left_align: bool,
    plus_sign: bool,
    space_sign: bool,
    zero_pad: bool,
    width: usize,
    precision: Option<usize>,
    kind: char,
}

impl PercentFormat {
    /// Parse a format string. An empty string yields `None` (no percentage labels).
    pub fn parse(input: &str) -> ChartResult<Option<Self>> {
        if input.is_empty() {
            return Ok(None);
        }

        let (_, pieces) = all_consuming(many1(piece))(input).map_err(|_| {
            ChartError::invalid_value(format!("invalid percentage format '{}'", input))
        })?;

        let placeholders = pieces
            .iter()
            .filter(|p| matches!(p, Piece::Value(_)))
            .count();
        if placeholders > 1 {
            return Err(ChartError::invalid_value(format!(
                "percentage format '{}' has {} placeholders, expected at most one",
                input, placeholders
            )));
        }

        Ok(Some(Self { pieces }))
    }

    /// Render `percent` (0-100) through the format.
    pub fn format(&self, percent: f64) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Literal(text) => text.clone(),
                Piece::Value(conversion) => conversion.apply(percent),
            })
            .collect()
    }
}

impl Conversion {
    fn apply(&self, v: f64) -> String {
        let body = match self.kind {
            'f' | 'F' => format!("{:.*}", self.precision.unwrap_or(6), v.abs()),
            'd' | 'i' => format!("{}", v.abs().trunc() as i64),
            'e' | 'E' => {
                let formatted = exponent_form(v.abs(), self.precision.unwrap_or(6));
                if self.kind == 'E' {
                    formatted.to_uppercase()
                } else {
                    formatted
                }
            }
            _ => {
                let text = format!("{}", v.abs());
                match self.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                }
            }
        };

        let sign = if v.is_sign_negative() && v != 0.0 {
            "-"
        } else if self.plus_sign {
            "+"
        } else if self.space_sign {
            " "
        } else {
            ""
        };

        let len = sign.len() + body.len();
        if len >= self.width {
            return format!("{}{}", sign, body);
        }
        let fill = self.width - len;
        if self.left_align {
            format!("{}{}{}", sign, body, " ".repeat(fill))
        } else if self.zero_pad && self.kind != 's' {
            format!("{}{}{}", sign, "0".repeat(fill), body)
        } else {
            format!("{}{}{}", " ".repeat(fill), sign, body)
        }
    }
}

/// C-style exponent notation: `1.500000e+01`.
fn exponent_form(v: f64, precision: usize) -> String {
    let formatted = format!("{:.*e}", precision, v);
    match formatted.split_once('e') {
        Some((mantissa, exp)) => {
            let (exp_sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, exp_sign, digits)
        }
        None => formatted,
    }
}

fn piece(input: &str) -> IResult<&str, Piece> {
    alt((escaped_percent, placeholder, literal))(input)
}

fn escaped_percent(input: &str) -> IResult<&str, Piece> {
    value(Piece::Literal("%".to_string()), tag("%%"))(input)
}

fn literal(input: &str) -> IResult<&str, Piece> {
    map(is_not("%"), |s: &str| Piece::Literal(s.to_string()))(input)
}

/// `%[flags][width][.precision]conversion`
fn placeholder(input: &str) -> IResult<&str, Piece> {
    map(
        preceded(
            char('%'),
            tuple((
                many0(one_of("-+ 0#")),
                opt(number),
                opt(preceded(char('.'), number)),
                one_of("fFdieEs"),
            )),
        ),
        |(flags, width, precision, kind)| {
            Piece::Value(Conversion {
                left_align: flags.contains(&'-'),
                plus_sign: flags.contains(&'+'),
                space_sign: flags.contains(&' '),
                zero_pad: flags.contains(&'0'),
                width: width.unwrap_or(0),
                precision,
                kind,
            })
        },
    )(input)
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, v: f64) -> String {
        PercentFormat::parse(spec).unwrap().unwrap().format(v)
    }

    #[test]
    fn test_default_format() {
        assert_eq!(fmt("%1.1f%%", 33.333), "33.3%");
        assert_eq!(fmt("%1.2f%%", 5.0), "5.00%");
    }

    #[test]
    fn test_integer_conversion_truncates() {
        assert_eq!(fmt("%d%%", 42.9), "42%");
        assert_eq!(fmt("%i", 7.2), "7");
    }

    #[test]
    fn test_width_and_flags() {
        assert_eq!(fmt("%6.1f", 3.27), "   3.3");
        assert_eq!(fmt("%-6.1f|", 3.5), "3.5   |");
        assert_eq!(fmt("%06.2f", 3.5), "003.50");
        assert_eq!(fmt("%+.0f", 12.0), "+12");
    }

    #[test]
    fn test_exponent_conversion() {
        assert_eq!(fmt("%.2e", 15.0), "1.50e+01");
        assert_eq!(fmt("%.1E", 0.05), "5.0E-02");
    }

    #[test]
    fn test_literal_only_format() {
        assert_eq!(fmt("slice", 10.0), "slice");
    }

    #[test]
    fn test_empty_format_is_none() {
        assert_eq!(PercentFormat::parse("").unwrap(), None);
    }

    #[test]
    fn test_too_many_placeholders() {
        let err = PercentFormat::parse("%f %f").unwrap_err();
        assert!(err.to_string().contains("2 placeholders"));
    }

    #[test]
    fn test_malformed_format() {
        for spec in ["%", "%1.1", "%q", "100%"] {
            assert!(
                matches!(PercentFormat::parse(spec), Err(ChartError::InvalidValue(_))),
                "{}",
                spec
            );
        }
    }
}
