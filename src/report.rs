use crate::types::FileStatus;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const BANNER: &str = "********************************************************";

/// Changed paths grouped by category, in the order the status provider
/// listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    branch: String,
    entries: Vec<(FileStatus, String)>,
}

impl ChangeReport {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, status: FileStatus, path: impl Into<String>) {
        self.entries.push((status, path.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self, status: FileStatus) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(s, _)| *s == status)
            .map(|(_, path)| path.as_str())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "BRANCH: {}", self.branch);
        out.push('\n');

        for status in FileStatus::ALL {
            let mut paths = self.paths(status).peekable();
            if paths.peek().is_none() {
                continue;
            }
            out.push_str(BANNER);
            out.push('\n');
            out.push_str(status.banner());
            out.push('\n');
            for path in paths {
                out.push_str(path);
                out.push('\n');
            }
        }
        out
    }

    /// Overwrites `path` with the rendered report.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write report {}", path.display()))
    }
}
