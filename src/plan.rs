use crate::paths::{common_path, normalize_lexically, starts_with_ignore_case, to_slash};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where this run writes its output. Built once; never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPlan {
    pub repo_root: PathBuf,
    pub backup_root: PathBuf,
    /// Path of `backup_root` below the common ancestor with `repo_root`,
    /// `/`-separated and without the `_<n>` suffix. Status entries under this
    /// prefix are earlier or concurrent backups and are left alone.
    pub excluded_prefix: String,
    pub report_path: PathBuf,
}

impl BackupPlan {
    /// Creates a fresh `Backup_<repo>_<branch>_<date>_<n>` directory under
    /// `backup_parent` (the repository itself when `None`) plus an empty
    /// sibling report file of the same name.
    pub fn create(
        repo_root: &Path,
        backup_parent: Option<&Path>,
        branch: &str,
        date: NaiveDate,
    ) -> Result<Self> {
        // `..` segments would hide a nested backup from the prefix match.
        let repo_root = normalize_lexically(repo_root);
        let parent = normalize_lexically(backup_parent.unwrap_or(&repo_root));
        fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create backup location {}", parent.display()))?;

        let stem = backup_stem(&repo_name(&repo_root), branch, date);
        let (backup_root, name) = create_fresh_dir(&parent, &stem)?;

        let report_path = parent.join(format!("{name}.txt"));
        File::create(&report_path)
            .with_context(|| format!("Failed to create report file {}", report_path.display()))?;

        let excluded_prefix = excluded_prefix(&repo_root, &backup_root);
        info!(
            backup_root = %backup_root.display(),
            excluded_prefix = %excluded_prefix,
            "backup directory created"
        );

        Ok(Self {
            repo_root,
            backup_root,
            excluded_prefix,
            report_path,
        })
    }

    /// True for status paths that belong to backup output.
    pub fn excludes(&self, rel_path: &str) -> bool {
        !self.excluded_prefix.is_empty() && starts_with_ignore_case(rel_path, &self.excluded_prefix)
    }
}

pub fn repo_name(repo_root: &Path) -> String {
    repo_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string())
}

/// Directory name without the numeric suffix. Path separators in the branch
/// name would nest the backup, so they become `-`.
pub fn backup_stem(repo_name: &str, branch: &str, date: NaiveDate) -> String {
    let branch = branch.replace(['/', '\\'], "-");
    format!("Backup_{}_{}_{}", repo_name, branch, date.format("%d%b%Y"))
}

pub fn backup_dir_name(stem: &str, n: u32) -> String {
    format!("{stem}_{n}")
}

/// Walks `_1`, `_2`, ... until a directory can be created that did not exist
/// before. Creation is non-recursive so a concurrent run that wins the race
/// pushes this one on to the next suffix.
fn create_fresh_dir(parent: &Path, stem: &str) -> Result<(PathBuf, String)> {
    for n in 1..=u32::MAX {
        let name = backup_dir_name(stem, n);
        let candidate = parent.join(&name);
        if candidate.exists() {
            continue;
        }
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((candidate, name)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(candidate = %candidate.display(), "lost race for backup directory");
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to create backup directory {}", candidate.display())
                });
            }
        }
    }
    bail!("No free backup directory name under {}", parent.display())
}

fn excluded_prefix(repo_root: &Path, backup_root: &Path) -> String {
    let common = common_path(backup_root, repo_root);
    let relative = backup_root.strip_prefix(&common).unwrap_or(backup_root);
    let relative = to_slash(relative);
    match relative.rsplit_once('_') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
            head.to_string()
        }
        _ => relative,
    }
}
