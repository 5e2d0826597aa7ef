//! Throwaway LDraw libraries for tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::{CleanupConfig, ImportConfig};
use crate::resolver::LibraryResolver;

/// A temporary library root that is deleted when dropped.
pub struct LibraryFixture {
    dir: TempDir,
}

impl LibraryFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a library-relative file.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a library file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn resolver(&self) -> LibraryResolver {
        LibraryResolver::new(self.root())
    }

    /// Config over this library with cleanup disabled, so tests see raw geometry.
    pub fn raw_config(&self) -> ImportConfig {
        ImportConfig {
            cleanup: CleanupConfig::none(),
            ..ImportConfig::with_library(self.root())
        }
    }
}
