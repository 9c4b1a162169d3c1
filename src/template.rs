use crate::error::{Error, Result};

/// Largest width or precision a conversion may ask for.
const MAX_FIELD: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Radix {
    Decimal,
    Octal,
    LowerHex,
    UpperHex,
}

#[derive(Debug, Clone, PartialEq)]
struct Conversion {
    zero_pad: bool,
    left: bool,
    width: usize,
    precision: Option<usize>,
    radix: Radix,
}

impl Conversion {
    fn render(&self, value: u64, out: &mut String) {
        let mut digits = match self.radix {
            Radix::Decimal => value.to_string(),
            Radix::Octal => format!("{:o}", value),
            Radix::LowerHex => format!("{:x}", value),
            Radix::UpperHex => format!("{:X}", value),
        };

        match self.precision {
            Some(0) if value == 0 => digits.clear(),
            Some(p) if digits.len() < p => {
                digits.insert_str(0, &"0".repeat(p - digits.len()));
            }
            _ => {}
        }

        let pad = self.width.saturating_sub(digits.len());
        if self.left {
            out.push_str(&digits);
            out.extend(std::iter::repeat(' ').take(pad));
        } else {
            // an explicit precision disables the zero flag
            let fill = if self.zero_pad && self.precision.is_none() {
                '0'
            } else {
                ' '
            };
            out.extend(std::iter::repeat(fill).take(pad));
            out.push_str(&digits);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    Number(Conversion),
}

/// printf-style pathname template with a single unsigned integer conversion,
/// e.g. `frames/%05d.pts`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTemplate {
    pieces: Vec<Piece>,
}

fn parse_field<I>(chars: &mut std::iter::Peekable<I>, source: &str) -> Result<usize>
where
    I: Iterator<Item = char>,
{
    let mut value = 0usize;

    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(d as usize))
            .filter(|&v| v <= MAX_FIELD)
            .ok_or_else(|| {
                Error::config(format!(
                    "Field width or precision in output template '{}' exceeds {}",
                    source, MAX_FIELD
                ))
            })?;
        chars.next();
    }

    Ok(value)
}

impl PathTemplate {
    pub fn parse(source: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut conversions = 0;
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut zero_pad = false;
            let mut left = false;
            while let Some(&flag) = chars.peek() {
                match flag {
                    '0' => zero_pad = true,
                    '-' => left = true,
                    _ => break,
                }
                chars.next();
            }

            let width = parse_field(&mut chars, source)?;

            let precision = if chars.peek() == Some(&'.') {
                chars.next();
                Some(parse_field(&mut chars, source)?)
            } else {
                None
            };

            // length modifiers carry no meaning for a frame number
            while let Some('h' | 'l' | 'z') = chars.peek() {
                chars.next();
            }

            let radix = match chars.next() {
                Some('d' | 'i' | 'u') => Radix::Decimal,
                Some('o') => Radix::Octal,
                Some('x') => Radix::LowerHex,
                Some('X') => Radix::UpperHex,
                Some(other) => {
                    return Err(Error::config(format!(
                        "Unsupported conversion '%{}' in output template '{}'",
                        other, source
                    )))
                }
                None => {
                    return Err(Error::config(format!(
                        "Output template '{}' ends inside a conversion",
                        source
                    )))
                }
            };

            conversions += 1;
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Number(Conversion {
                zero_pad: zero_pad && !left,
                left,
                width,
                precision,
                radix,
            }));
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        if conversions != 1 {
            return Err(Error::config(format!(
                "Output template '{}' must contain exactly one unsigned integer conversion, found {}",
                source, conversions
            )));
        }

        Ok(Self { pieces })
    }

    pub fn render(&self, value: u64) -> String {
        let mut out = String::new();

        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Number(conv) => conv.render(value, &mut out),
            }
        }

        out
    }
}
