// Output store: the directory of produced trims
//
// Filenames are always generated here, never taken from callers. Deletion is
// best-effort and uncoordinated with in-flight writes.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use uuid::Uuid;
use walkdir::WalkDir;

pub const OUTPUT_EXTENSION: &str = "mp4";

#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fresh output name and the path it will be written to.
    pub fn allocate(&self) -> (String, PathBuf) {
        let filename = format!("{}.{}", Uuid::new_v4().simple(), OUTPUT_EXTENSION);
        let path = self.dir.join(&filename);
        (filename, path)
    }

    /// Path of an existing output, or `None` for names that are absent or
    /// would escape the store directory.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return None,
        }
        if filename.contains(['/', '\\']) {
            return None;
        }

        let path = self.dir.join(filename);
        path.is_file().then_some(path)
    }

    fn entries(&self) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
    }

    /// Number of produced videos currently in the store.
    pub fn count(&self) -> io::Result<usize> {
        let mut count = 0;
        for entry in self.entries() {
            let entry = entry?;
            let is_output = entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|s| s.eq_ignore_ascii_case(OUTPUT_EXTENSION))
                    .unwrap_or(false);
            if is_output {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Remove every file in the store. Entries that cannot be removed are
    /// skipped; only a failure to list the directory is an error.
    pub fn delete_all(&self) -> io::Result<usize> {
        let mut paths = Vec::new();
        for entry in self.entries() {
            paths.push(entry?.into_path());
        }

        let mut deleted = 0;
        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => warn!("Skipping {:?}: {}", path, e),
            }
        }
        Ok(deleted)
    }
}
