//! Import configuration.
//!
//! Everything here has a sensible default; a JSON file only needs to name
//! the keys it overrides:
//!
//! ```json
//! { "library_root": "/opt/ldraw", "cleanup": { "weld_threshold": null } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Library subdirectories searched in priority order.
///
/// Low-resolution primitives (`p`) win over high-resolution ones (`p/48`).
pub const DEFAULT_SEARCH_PATHS: [&str; 4] = ["parts", "p", "p/48", "parts/s"];

/// Hard limit on sub-file nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Part names are truncated to this many characters.
pub const DEFAULT_PART_NAME_LIMIT: usize = 50;

/// LDraw units to meters (1 LDU = 0.4 mm).
pub const DEFAULT_SCALE: f32 = 0.0004;

/// Errors that can occur while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for one importer instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Root of the LDraw part library.
    pub library_root: PathBuf,

    /// Subdirectories of `library_root`, highest priority first.
    pub search_paths: Vec<String>,

    /// Sub-file references nested deeper than this are dropped.
    pub max_depth: usize,

    /// Maximum characters kept from a part's leading comment.
    pub part_name_limit: usize,

    /// Post-processing applied to every imported mesh.
    pub cleanup: CleanupConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::new(),
            search_paths: DEFAULT_SEARCH_PATHS.iter().map(|s| s.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            part_name_limit: DEFAULT_PART_NAME_LIMIT,
            cleanup: CleanupConfig::default(),
        }
    }
}

impl ImportConfig {
    /// Default settings for the library at `library_root`.
    pub fn with_library(library_root: impl Into<PathBuf>) -> Self {
        Self {
            library_root: library_root.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }
}

/// Mesh cleanup run after flattening, in the order weld, normals, fix-up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Merge vertices closer than this (LDraw units). `None` disables welding.
    pub weld_threshold: Option<f32>,

    /// Compute smooth vertex normals.
    pub compute_normals: bool,

    /// Uniform scale applied by the coordinate fix-up.
    pub scale: f32,

    /// Rotate LDraw's -Y up into +Z up.
    pub rotate_to_z_up: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            weld_threshold: Some(0.1),
            compute_normals: true,
            scale: DEFAULT_SCALE,
            rotate_to_z_up: true,
        }
    }
}

impl CleanupConfig {
    /// Leave the flattened geometry untouched.
    pub fn none() -> Self {
        Self {
            weld_threshold: None,
            compute_normals: false,
            scale: 1.0,
            rotate_to_z_up: false,
        }
    }
}
