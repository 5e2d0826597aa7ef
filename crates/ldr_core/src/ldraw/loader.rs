//! Recursive geometry flattening.
//!
//! [`GeometryParser`] streams one LDraw file, descends into every resolvable
//! sub-file reference with the composed placement, and appends the
//! resulting triangles and quads to a shared [`ParseSession`]. Vertices are
//! stored already transformed into the root file's space and are never
//! deduplicated here.
//!
//! Failures below the root never abort the walk: unresolved references,
//! unreadable sub-files, cyclic or over-deep nesting and malformed lines are
//! logged, recorded as [`Diagnostic`]s, and contribute no geometry.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use ldr_math::{Mat4, Mat4Ext, Vec3};
use thiserror::Error;

use super::parser::{parse_line, LineError};
use super::types::{Command, Face};
use crate::config::{ImportConfig, DEFAULT_MAX_DEPTH, DEFAULT_PART_NAME_LIMIT};
use crate::resolver::LibraryResolver;

/// Stack left free before `stacker` allocates a new segment.
const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each stack segment allocated for deep recursion.
const STACK_SEGMENT_SIZE: usize = 1024 * 1024;

/// Errors from parsing one file invocation.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sub-file nesting deeper than {depth} levels at {path}")]
    DepthExceeded { path: PathBuf, depth: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Something that did not contribute geometry during a walk.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A sub-file reference matched nothing in the search path.
    Unresolved {
        parent: PathBuf,
        line: usize,
        file: String,
    },

    /// A resolved sub-file could not be opened or read.
    Unreadable { path: PathBuf, reason: String },

    /// A sub-file sat deeper than the nesting limit.
    TooDeep { path: PathBuf, depth: usize },

    /// A sub-file referenced a file that is still open further up the walk.
    Cyclic {
        parent: PathBuf,
        line: usize,
        path: PathBuf,
    },

    /// A line did not match the schema of its type.
    Malformed {
        path: PathBuf,
        line: usize,
        error: LineError,
    },
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        match error {
            ParseError::Io { path, source } => Diagnostic::Unreadable {
                path: path.clone(),
                reason: source.to_string(),
            },
            ParseError::DepthExceeded { path, depth } => Diagnostic::TooDeep {
                path: path.clone(),
                depth: *depth,
            },
        }
    }
}

/// Accumulated output of one load.
///
/// Owned by the caller and lent mutably to every nested parse, so geometry
/// lands in the order the references appear in their parent files.
#[derive(Clone, Debug, Default)]
pub struct ParseSession {
    /// Vertex positions in root-file space.
    pub vertices: Vec<Vec3>,

    /// Faces indexing into `vertices`.
    pub faces: Vec<Face>,

    /// Leading comment of every visited file that had one, in visit order.
    /// Only the first entry names the part.
    pub part_names: Vec<String>,

    /// Branches and lines that contributed nothing.
    pub diagnostics: Vec<Diagnostic>,

    files_parsed: usize,
}

impl ParseSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name of the root part, if its first line was a comment.
    pub fn part_name(&self) -> Option<&str> {
        self.part_names.first().map(String::as_str)
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of files opened during the walk, counting repeats.
    pub fn files_parsed(&self) -> usize {
        self.files_parsed
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Flattens LDraw files through a [`LibraryResolver`].
#[derive(Clone, Debug)]
pub struct GeometryParser<'a> {
    resolver: &'a LibraryResolver,
    max_depth: usize,
    part_name_limit: usize,
}

impl<'a> GeometryParser<'a> {
    pub fn new(resolver: &'a LibraryResolver) -> Self {
        Self {
            resolver,
            max_depth: DEFAULT_MAX_DEPTH,
            part_name_limit: DEFAULT_PART_NAME_LIMIT,
        }
    }

    pub fn from_config(resolver: &'a LibraryResolver, config: &ImportConfig) -> Self {
        Self {
            resolver,
            max_depth: config.max_depth,
            part_name_limit: config.part_name_limit,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_part_name_limit(mut self, limit: usize) -> Self {
        self.part_name_limit = limit;
        self
    }

    /// Parse `path` placed by `transform`, appending into `session`.
    ///
    /// Only a failure to read `path` itself is returned; everything below it
    /// is absorbed into `session.diagnostics`.
    pub fn parse(&self, path: &Path, transform: Mat4, session: &mut ParseSession) -> ParseResult<()> {
        let mut open = Vec::new();
        self.parse_nested(path, transform, session, &mut open)
    }

    /// Parse one file while `open` holds the canonical paths of its ancestors.
    fn parse_nested(
        &self,
        path: &Path,
        transform: Mat4,
        session: &mut ParseSession,
        open: &mut Vec<PathBuf>,
    ) -> ParseResult<()> {
        let depth = open.len();
        if depth > self.max_depth {
            return Err(ParseError::DepthExceeded {
                path: path.to_path_buf(),
                depth: self.max_depth,
            });
        }

        let io_error = |source: std::io::Error| ParseError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Closed when this call returns, on every path.
        let file = File::open(path).map_err(io_error)?;
        let reader = BufReader::new(file);
        session.files_parsed += 1;
        log::debug!("Parsing {} (depth {})", path.display(), depth);

        open.push(canonical_key(path));
        let result = self.parse_lines(reader, path, transform, session, open);
        open.pop();
        result
    }

    fn parse_lines(
        &self,
        mut reader: BufReader<File>,
        path: &Path,
        transform: Mat4,
        session: &mut ParseSession,
        open: &mut Vec<PathBuf>,
    ) -> ParseResult<()> {
        let io_error = |source: std::io::Error| ParseError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut buf = Vec::new();
        let mut line_number = 0usize;
        let mut content_lines = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(io_error)? == 0 {
                break;
            }
            line_number += 1;

            // Library files are not always valid UTF-8
            let text = String::from_utf8_lossy(&buf);
            if text.trim().is_empty() {
                continue;
            }

            let parsed = parse_line(&text);
            if matches!(parsed, Err(LineError::MissingSeparator)) {
                continue;
            }
            let first_line = content_lines == 0;
            content_lines += 1;

            match parsed {
                Ok(Some(command)) => {
                    self.apply(command, path, line_number, first_line, transform, session, open)
                }
                Ok(None) => {}
                Err(error) => {
                    log::debug!("{}:{}: skipping malformed line: {}", path.display(), line_number, error);
                    session.diagnostics.push(Diagnostic::Malformed {
                        path: path.to_path_buf(),
                        line: line_number,
                        error,
                    });
                }
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        &self,
        command: Command,
        path: &Path,
        line_number: usize,
        first_line: bool,
        transform: Mat4,
        session: &mut ParseSession,
        open: &mut Vec<PathBuf>,
    ) {
        match command {
            Command::Comment(text) => {
                if first_line {
                    session
                        .part_names
                        .push(text.chars().take(self.part_name_limit).collect());
                }
            }
            Command::SubFile { transform: local, file, .. } => {
                let Some(child) = self.resolver.resolve(&file) else {
                    log::debug!("{}:{}: dropping unresolved reference '{}'", path.display(), line_number, file);
                    session.diagnostics.push(Diagnostic::Unresolved {
                        parent: path.to_path_buf(),
                        line: line_number,
                        file,
                    });
                    return;
                };

                if open.contains(&canonical_key(&child)) {
                    log::warn!("{}:{}: skipping cyclic reference to {}", path.display(), line_number, child.display());
                    session.diagnostics.push(Diagnostic::Cyclic {
                        parent: path.to_path_buf(),
                        line: line_number,
                        path: child,
                    });
                    return;
                }

                let placed = transform * local;
                let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
                    self.parse_nested(&child, placed, session, open)
                });
                if let Err(error) = result {
                    log::warn!("Skipping sub-file branch: {}", error);
                    session.diagnostics.push(Diagnostic::from(&error));
                }
            }
            Command::Triangle { points, .. } => push_polygon(&points, transform, session),
            Command::Quad { points, .. } => push_polygon(&points, transform, session),
            Command::Line { .. } | Command::OptionalLine { .. } => {}
        }
    }
}

/// Identity of a file on the open stack; falls back to the path as given.
fn canonical_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn push_polygon(points: &[Vec3], transform: Mat4, session: &mut ParseSession) {
    let indices: Vec<u32> = points
        .iter()
        .map(|&point| session.push_vertex(transform.place_point(point)))
        .collect();
    if let Some(face) = Face::from_indices(&indices) {
        session.faces.push(face);
    }
}

/// Flatten `path` with the identity placement into a fresh session.
pub fn flatten_file(resolver: &LibraryResolver, path: &Path) -> ParseResult<ParseSession> {
    let mut session = ParseSession::new();
    GeometryParser::new(resolver).parse(path, Mat4::IDENTITY, &mut session)?;
    Ok(session)
}
