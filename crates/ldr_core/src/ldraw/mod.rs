//! LDraw (`.dat`) support.
//!
//! This module parses LDraw text files and flattens their sub-file
//! reference trees into a single list of vertices and faces.
//!
//! ## Line types
//!
//! - `0` comments: the first one of a file names the part, meta commands
//!   (`BFC`, `!LDRAW_ORG`, ...) are ignored
//! - `1` sub-file references: resolved through the library and recursed into
//! - `3` triangles and `4` quads: emitted as faces
//! - `2` lines and `5` optional lines: parsed, contribute no faces
//!
//! ## Not Supported
//!
//! - Colors (parsed, never applied)
//! - BFC winding and certification
//! - Multi-part documents (`0 FILE` / `.mpd`)
//!
//! # Example
//!
//! ```ignore
//! use ldr_core::ldraw::flatten_file;
//! use ldr_core::LibraryResolver;
//!
//! let resolver = LibraryResolver::new("/opt/ldraw");
//! let path = resolver.resolve("3003.dat").unwrap();
//! let session = flatten_file(&resolver, &path)?;
//! println!("{} vertices, {} faces", session.vertex_count(), session.face_count());
//! ```

mod loader;
mod parser;
mod types;

pub use loader::*;
pub use parser::*;
pub use types::*;
