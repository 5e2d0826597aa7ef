//! LDR Core - LDraw part import for 3D scenes.
//!
//! This crate provides:
//!
//! - **File resolution**: `LibraryResolver` finds referenced files in an
//!   LDraw library by search-path priority
//! - **Geometry flattening**: `GeometryParser` walks a part's sub-file tree
//!   and collects every triangle and quad in root-file space
//! - **Mesh cleanup**: `Mesh` welding, normals and the coordinate fix-up
//! - **Import**: `PartImporter` loads and replaces parts in a `Scene`
//!
//! # Example
//!
//! ```ignore
//! use ldr_core::{ImportConfig, PartImporter, Scene};
//!
//! let importer = PartImporter::new(ImportConfig::with_library("/opt/ldraw"));
//! let mut scene = Scene::new("bricks");
//! importer.load(&mut scene, "3003")?;
//! println!("{} objects, {} faces", scene.object_count(), scene.total_face_count());
//! ```

pub mod config;
pub mod importer;
pub mod ldraw;
pub mod mesh;
pub mod resolver;
pub mod scene;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{CleanupConfig, ConfigError, ImportConfig};
pub use importer::{extract_part_id, LoadError, LoadOutcome, LoadResult, PartImporter};
pub use ldraw::{flatten_file, Diagnostic, Face, GeometryParser, ParseError, ParseSession};
pub use mesh::{GpuVertex, Mesh};
pub use resolver::LibraryResolver;
pub use scene::{Scene, SceneObject};
