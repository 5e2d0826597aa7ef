//! LDraw library file resolution.
//!
//! Sub-file references name files the way the authoring tool saw them
//! (`s\3001s01.dat`, `48/4-4edge.dat`, `Stud.DAT`). The resolver reduces a
//! reference to a lowercase base name and looks it up in the configured
//! search directories, first match wins.

use std::path::{Path, PathBuf};

use crate::config::{ImportConfig, DEFAULT_SEARCH_PATHS};

/// Extension appended to part identifiers.
pub const PART_EXTENSION: &str = "dat";

/// Directory that holds instantiable parts.
const PARTS_DIR: &str = "parts";

/// Reduce a referenced file name to its lowercase base name.
///
/// Both `/` and `\` are treated as separators so the result does not depend
/// on the host platform.
pub fn normalize_name(referenced: &str) -> String {
    let trimmed = referenced.trim();
    let base = trimmed
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(trimmed);
    base.to_lowercase()
}

/// Base file name without its extension, used as a part identifier.
pub fn derive_id(filename: &str) -> String {
    let base = filename
        .trim()
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    match base.rfind('.') {
        Some(dot) if dot > 0 => base[..dot].to_string(),
        _ => base.to_string(),
    }
}

/// File name for a part identifier (`"3003"` -> `"3003.dat"`).
pub fn id_to_filename(part_id: &str) -> String {
    format!("{}.{}", part_id.trim(), PART_EXTENSION)
}

/// Resolves file references against an LDraw library on disk.
///
/// Read-only: every query only checks for file existence.
#[derive(Clone, Debug)]
pub struct LibraryResolver {
    root: PathBuf,
    search_paths: Vec<PathBuf>,
}

impl LibraryResolver {
    /// Resolver over `root` using the standard search order.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_search_paths(root, DEFAULT_SEARCH_PATHS)
    }

    /// Resolver over `root` with an explicit search order.
    ///
    /// Search entries use `/` separators regardless of platform.
    pub fn with_search_paths<I, S>(root: impl Into<PathBuf>, search_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let search_paths = search_paths
            .into_iter()
            .map(|dir| dir.as_ref().split('/').filter(|c| !c.is_empty()).collect::<PathBuf>())
            .collect();
        Self {
            root: root.into(),
            search_paths,
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self::with_search_paths(&config.library_root, &config.search_paths)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate a referenced file.
    ///
    /// Returns `None` when no search directory contains it; callers treat
    /// that as an external or unavailable model.
    pub fn resolve(&self, referenced: &str) -> Option<PathBuf> {
        let name = normalize_name(referenced);
        if name.is_empty() {
            return None;
        }

        let found = self
            .search_paths
            .iter()
            .map(|dir| self.root.join(dir).join(&name))
            .find(|candidate| candidate.is_file());

        match &found {
            Some(path) => log::trace!("Resolved '{}' -> {}", referenced, path.display()),
            None => log::debug!("Could not resolve '{}' in {}", referenced, self.root.display()),
        }
        found
    }

    /// True if `filename` is a top-level part (lives directly in `parts/`).
    pub fn is_instantiable_part(&self, filename: &str) -> bool {
        let name = normalize_name(filename);
        !name.is_empty() && self.root.join(PARTS_DIR).join(name).is_file()
    }
}
