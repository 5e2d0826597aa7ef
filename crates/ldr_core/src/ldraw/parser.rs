//! LDraw line parser.
//!
//! Each line is `<type> <fields...>`. The fields of every line type have a
//! fixed positional schema:
//!
//! - `0 <text>`
//! - `1 <color> x y z a b c d e f g h i <file>`
//! - `2 <color> x1 y1 z1 x2 y2 z2`
//! - `3 <color> x1 y1 z1 x2 y2 z2 x3 y3 z3`
//! - `4 <color> x1 y1 z1 x2 y2 z2 x3 y3 z3 x4 y4 z4`
//! - `5 <color> x1 y1 z1 x2 y2 z2 x3 y3 z3 x4 y4 z4`
//!
//! Trailing extra fields are ignored. Unknown type tags parse to `None`.

use ldr_math::{ldraw_matrix, Vec3};
use thiserror::Error;

use super::types::{ColorCode, Command};

/// Reasons a single line could not be turned into a [`Command`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    #[error("no separator after the line type tag")]
    MissingSeparator,

    #[error("invalid line type tag: {0}")]
    InvalidTag(String),

    #[error("line type {line_type} expects {expected} fields, found {found}")]
    MissingField {
        line_type: u32,
        expected: usize,
        found: usize,
    },

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("invalid color code: {0}")]
    InvalidColor(String),

    #[error("sub-file reference without a file name")]
    MissingFileName,
}

/// Result type for line parsing.
pub type LineResult<T> = Result<T, LineError>;

/// Parse one physical line.
///
/// Returns `Ok(None)` for blank lines and unknown line types.
pub fn parse_line(line: &str) -> LineResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (tag, data) = line
        .split_once(char::is_whitespace)
        .ok_or(LineError::MissingSeparator)?;
    let line_type: u32 = tag
        .parse()
        .map_err(|_| LineError::InvalidTag(tag.to_string()))?;

    let mut fields = Fields::new(line_type, data);
    let command = match line_type {
        // Comment text is trimmed on both sides
        0 => Command::Comment(data.trim().to_string()),
        1 => {
            let color = fields.color()?;
            let translation = fields.vec3()?;
            let mut linear = [0.0f32; 9];
            for coefficient in linear.iter_mut() {
                *coefficient = fields.number()?;
            }
            let file = fields.remainder();
            if file.is_empty() {
                return Err(LineError::MissingFileName);
            }
            Command::SubFile {
                color,
                transform: ldraw_matrix(translation, linear),
                file: file.to_string(),
            }
        }
        2 => Command::Line {
            color: fields.color()?,
            points: [fields.vec3()?, fields.vec3()?],
        },
        3 => Command::Triangle {
            color: fields.color()?,
            points: [fields.vec3()?, fields.vec3()?, fields.vec3()?],
        },
        4 => Command::Quad {
            color: fields.color()?,
            points: [fields.vec3()?, fields.vec3()?, fields.vec3()?, fields.vec3()?],
        },
        5 => Command::OptionalLine {
            color: fields.color()?,
            points: [fields.vec3()?, fields.vec3()?],
            controls: [fields.vec3()?, fields.vec3()?],
        },
        other => {
            log::trace!("Ignoring unknown line type {}", other);
            return Ok(None);
        }
    };

    Ok(Some(command))
}

/// Number of fields after the tag each geometric line type requires.
fn expected_fields(line_type: u32) -> usize {
    match line_type {
        1 => 14,
        2 => 7,
        3 => 10,
        4 | 5 => 13,
        _ => 0,
    }
}

/// Positional cursor over the whitespace-separated fields of one line.
struct Fields<'a> {
    line_type: u32,
    rest: &'a str,
    consumed: usize,
}

impl<'a> Fields<'a> {
    fn new(line_type: u32, data: &'a str) -> Self {
        Self {
            line_type,
            rest: data,
            consumed: 0,
        }
    }

    fn token(&mut self) -> LineResult<&'a str> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            return Err(LineError::MissingField {
                line_type: self.line_type,
                expected: expected_fields(self.line_type),
                found: self.consumed,
            });
        }

        let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (token, rest) = trimmed.split_at(end);
        self.rest = rest;
        self.consumed += 1;
        Ok(token)
    }

    fn number(&mut self) -> LineResult<f32> {
        let token = self.token()?;
        token
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| LineError::InvalidNumber(token.to_string()))
    }

    fn vec3(&mut self) -> LineResult<Vec3> {
        Ok(Vec3::new(self.number()?, self.number()?, self.number()?))
    }

    fn color(&mut self) -> LineResult<ColorCode> {
        let token = self.token()?;
        let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => token.parse::<u32>(),
        };
        parsed
            .map(ColorCode)
            .map_err(|_| LineError::InvalidColor(token.to_string()))
    }

    /// Everything left on the line, used for file names that may contain spaces.
    fn remainder(&self) -> &'a str {
        self.rest.trim()
    }
}
