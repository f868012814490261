use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::Context;

/// Where raw asset bytes come from. Implementations may block (network, disk).
pub trait MediaSource: Send + Sync {
    fn fetch(&self, reference: &str) -> anyhow::Result<Vec<u8>>;
}

/// Reads references as paths relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MediaSource for FsSource {
    fn fetch(&self, reference: &str) -> anyhow::Result<Vec<u8>> {
        let rel = normalize_rel_path(reference)?;
        let path = self.root.join(Path::new(&rel));
        std::fs::read(&path).with_context(|| format!("read asset bytes from '{}'", path.display()))
    }
}

/// In-memory source keyed by reference; used for inline values and tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reference: impl Into<String>, bytes: Vec<u8>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(reference.into(), bytes);
        }
    }

    pub fn with(self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(reference, bytes);
        self
    }
}

impl MediaSource for MemorySource {
    fn fetch(&self, reference: &str) -> anyhow::Result<Vec<u8>> {
        let files = self
            .files
            .read()
            .map_err(|_| anyhow::anyhow!("memory source lock poisoned"))?;
        files
            .get(reference)
            .cloned()
            .with_context(|| format!("no in-memory asset named '{reference}'"))
    }
}

/// Normalize and validate root-relative asset paths.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths or parent
/// traversals (`..`).
pub fn normalize_rel_path(source: &str) -> anyhow::Result<String> {
    let s = source.replace('\\', "/");
    anyhow::ensure!(!s.is_empty(), "asset path must be non-empty");
    anyhow::ensure!(!s.starts_with('/'), "asset paths must be relative");
    anyhow::ensure!(!s.contains("://"), "remote references are not readable from disk");

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        anyhow::ensure!(part != "..", "asset paths must not contain '..'");
        out.push(part);
    }
    anyhow::ensure!(!out.is_empty(), "asset path must contain a file name");
    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
