use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway directory populated with fixture files.
///
/// Typically used as a source root (`com/example/Person.java`) or a class
/// output directory (`com/example/Person$Builder.class`).
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create fixture temp dir"),
        }
    }

    /// Creates a directory containing the given `(relative path, contents)` pairs.
    pub fn with_files<C: AsRef<[u8]>>(files: &[(&str, C)]) -> Self {
        let fixture = Self::new();
        for (rel, contents) in files {
            fixture.write(rel, contents);
        }
        fixture
    }

    pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture parent dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}
