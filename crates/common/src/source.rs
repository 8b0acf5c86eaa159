//! Source text cache for displaying the lines a program is paused on.
//!
//! Files are read lazily, split into lines once, and kept for the life of
//! the cache. A file that cannot be found is remembered as missing so the
//! filesystem is not probed again on every step.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A position in a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SourceLoc {
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based, 0 when unknown).
    pub col: u32,
}

impl SourceLoc {
    /// Create a new source location.
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Lazily populated cache of source files, keyed by the name debug info uses.
#[derive(Debug, Default)]
pub struct SourceCache {
    /// Directories searched when a name does not resolve as given.
    search_dirs: Vec<PathBuf>,
    /// Loaded files; `None` marks a file that could not be read.
    files: HashMap<String, Option<Vec<String>>>,
}

impl SourceCache {
    /// Create an empty cache that only resolves names as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache that also looks for files under the given directories.
    pub fn with_search_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_dirs: dirs.into_iter().collect(),
            files: HashMap::new(),
        }
    }

    /// Add a search directory.
    pub fn add_search_dir(&mut self, dir: impl AsRef<Path>) {
        self.search_dirs.push(dir.as_ref().to_path_buf());
    }

    /// Register source text directly, bypassing the filesystem.
    pub fn insert(&mut self, name: &str, text: &str) {
        let lines = text.lines().map(str::to_string).collect();
        self.files.insert(name.to_string(), Some(lines));
    }

    /// Drop everything loaded so far (e.g. after sources changed on disk).
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Whether the named file is (or can be) loaded.
    pub fn contains(&mut self, name: &str) -> bool {
        self.load(name).is_some()
    }

    /// Fetch one line (1-based).
    pub fn line(&mut self, name: &str, line: u32) -> Option<&str> {
        let lines = self.load(name)?;
        let index = (line as usize).checked_sub(1)?;
        lines.get(index).map(String::as_str)
    }

    /// Fetch up to `radius` lines either side of `line`, with line numbers.
    pub fn window(&mut self, name: &str, line: u32, radius: u32) -> Vec<(u32, &str)> {
        let Some(lines) = self.load(name) else {
            return Vec::new();
        };
        let first = line.saturating_sub(radius).max(1);
        let last = line.saturating_add(radius).min(lines.len() as u32);
        (first..=last)
            .filter_map(|n| lines.get(n as usize - 1).map(|text| (n, text.as_str())))
            .collect()
    }

    fn load(&mut self, name: &str) -> Option<&Vec<String>> {
        if !self.files.contains_key(name) {
            let loaded = self.read_from_disk(name);
            self.files.insert(name.to_string(), loaded);
        }
        self.files.get(name).and_then(Option::as_ref)
    }

    fn read_from_disk(&self, name: &str) -> Option<Vec<String>> {
        let direct = PathBuf::from(name);
        let file_name = direct.file_name().map(PathBuf::from);
        let candidates = std::iter::once(direct.clone()).chain(
            self.search_dirs
                .iter()
                .flat_map(|dir| {
                    let mut paths = vec![dir.join(&direct)];
                    if let Some(ref file_name) = file_name {
                        paths.push(dir.join(file_name));
                    }
                    paths
                }),
        );

        for path in candidates {
            if let Ok(text) = fs::read_to_string(&path) {
                return Some(text.lines().map(str::to_string).collect());
            }
        }
        None
    }
}
