//! LDraw line commands.
//!
//! One [`Command`] per non-blank line, produced by [`parse_line`](super::parse_line)
//! before any file resolution or transform composition happens.

use ldr_math::{Mat4, Vec3};

/// An LDraw color code.
///
/// Either an index into the color table (`4` is red, `16` is "inherit") or
/// a direct `0x2RRGGBB` color. Parsed and carried, never interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorCode(pub u32);

impl ColorCode {
    /// The "current color" code that inherits from the referencing line.
    pub const INHERIT: ColorCode = ColorCode(16);
}

/// A single parsed LDraw line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Type 0: comment or meta command. Holds the text after the tag.
    Comment(String),

    /// Type 1: sub-file reference placed by `transform`.
    SubFile {
        color: ColorCode,
        transform: Mat4,
        file: String,
    },

    /// Type 2: edge line.
    Line { color: ColorCode, points: [Vec3; 2] },

    /// Type 3: triangle.
    Triangle { color: ColorCode, points: [Vec3; 3] },

    /// Type 4: quadrilateral.
    Quad { color: ColorCode, points: [Vec3; 4] },

    /// Type 5: optional (conditional) edge line.
    OptionalLine {
        color: ColorCode,
        points: [Vec3; 2],
        controls: [Vec3; 2],
    },
}

impl Command {
    /// Numeric line-type tag this command was parsed from.
    pub fn line_type(&self) -> u8 {
        match self {
            Command::Comment(_) => 0,
            Command::SubFile { .. } => 1,
            Command::Line { .. } => 2,
            Command::Triangle { .. } => 3,
            Command::Quad { .. } => 4,
            Command::OptionalLine { .. } => 5,
        }
    }

    /// Polygon corners for triangles and quads, `None` for everything else.
    pub fn polygon(&self) -> Option<&[Vec3]> {
        match self {
            Command::Triangle { points, .. } => Some(points.as_slice()),
            Command::Quad { points, .. } => Some(points.as_slice()),
            _ => None,
        }
    }
}

/// A polygon of the flattened mesh, as indices into the shared vertex list.
///
/// Corner order is the order the source line declared them in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Tri([u32; 3]),
    Quad([u32; 4]),
}

impl Face {
    /// Build a face from 3 or 4 indices.
    pub fn from_indices(indices: &[u32]) -> Option<Face> {
        match *indices {
            [a, b, c] => Some(Face::Tri([a, b, c])),
            [a, b, c, d] => Some(Face::Quad([a, b, c, d])),
            _ => None,
        }
    }

    pub fn indices(&self) -> &[u32] {
        match self {
            Face::Tri(indices) => indices,
            Face::Quad(indices) => indices,
        }
    }

    pub fn corner_count(&self) -> usize {
        self.indices().len()
    }
}
