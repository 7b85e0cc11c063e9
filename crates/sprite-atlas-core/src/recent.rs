use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Upper bound on retained entries.
const CAPACITY: usize = 10;

/// Bounded most-recently-used list of `(name, path)` pairs, unique by path.
///
/// Persisted as flat text, one `name:path` per line, MRU first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentFiles {
    entries: Vec<(String, PathBuf)>,
}

impl RecentFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the front. An existing entry with the same path is moved up
    /// rather than duplicated; the oldest entry falls off past capacity.
    pub fn add(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        let path = path.into();
        self.entries.retain(|(_, p)| *p != path);
        self.entries.insert(0, (name.into(), path));
        self.entries.truncate(CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_path()))
    }

    /// Reads a persisted list. Malformed lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut out = Self::default();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((name, p)) if !name.is_empty() && !p.is_empty() => {
                    let p = PathBuf::from(p);
                    if !out.entries.iter().any(|(_, q)| *q == p) {
                        out.entries.push((name.to_string(), p));
                    }
                }
                _ => warn!("skipping malformed recent-files line: {line:?}"),
            }
        }
        out.entries.truncate(CAPACITY);
        Ok(out)
    }

    /// Writes the list back out in load-compatible form.
    pub fn dump(&self, path: &Path) -> Result<()> {
        let mut text = String::new();
        for (name, p) in &self.entries {
            text.push_str(&format!("{name}:{}\n", p.display()));
        }
        fs::write(path, text)?;
        Ok(())
    }
}
