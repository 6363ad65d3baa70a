use crate::paths::to_slash;
use crate::types::{BranchInfo, StatusEntry, StatusFlags};
use anyhow::{bail, Context, Result};
use git2::{Delta, ErrorCode, Repository, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The single capability the backup pipeline needs from version control.
pub trait StatusProvider {
    fn branch(&self) -> BranchInfo;

    /// Every path that differs from HEAD or the index, in provider order.
    /// Ignored paths are only listed when `include_ignored` is set.
    fn statuses(&self, include_ignored: bool) -> Result<Vec<StatusEntry>>;
}

pub fn get_repo(path: &Path) -> Result<Repository> {
    let repo = Repository::open(path)
        .with_context(|| format!("Not a git repository: {}", path.display()))?;
    if repo.is_bare() {
        bail!("Repository has no working directory");
    }
    Ok(repo)
}

pub fn get_branch_info(repo: &Repository) -> BranchInfo {
    match repo.head() {
        Ok(head) => {
            if head.is_branch() {
                if let Some(name) = head.shorthand() {
                    return BranchInfo::Branch(name.to_string());
                }
            }
            if let Some(oid) = head.target() {
                let full = oid.to_string();
                return BranchInfo::Detached(full[..7.min(full.len())].to_string());
            }
        }
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            if let Some(name) = unborn_branch_name(repo) {
                return BranchInfo::Unborn(name);
            }
        }
        Err(e) => debug!(error = %e, "unable to resolve HEAD"),
    }
    BranchInfo::Detached("unknown".to_string())
}

fn unborn_branch_name(repo: &Repository) -> Option<String> {
    let head = repo.find_reference("HEAD").ok()?;
    let target = head.symbolic_target()?;
    Some(target.strip_prefix("refs/heads/").unwrap_or(target).to_string())
}

pub fn get_status(repo: &Repository, include_ignored: bool) -> Result<Vec<StatusEntry>> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(include_ignored)
        .recurse_ignored_dirs(false)
        .include_unmodified(false)
        .include_unreadable(false)
        .renames_head_to_index(true);

    let statuses = repo.statuses(Some(&mut opts))?;

    let entries: Vec<StatusEntry> = statuses
        .iter()
        .map(|entry| {
            let (path, rel_path) = entry_path(&entry);
            StatusEntry::with_rel_path(path, rel_path, StatusFlags::from(entry.status()))
        })
        .collect();

    debug!(count = entries.len(), include_ignored, "status query finished");
    Ok(entries)
}

/// Display form and on-disk form of an entry's path. Renamed entries report
/// the path that exists after the rename.
fn entry_path(entry: &git2::StatusEntry<'_>) -> (String, PathBuf) {
    let renamed = entry
        .head_to_index()
        .filter(|delta| delta.status() == Delta::Renamed)
        .or_else(|| {
            entry
                .index_to_workdir()
                .filter(|delta| delta.status() == Delta::Renamed)
        });

    if let Some(path) = renamed.as_ref().and_then(|delta| delta.new_file().path()) {
        return (to_slash(path), path.to_path_buf());
    }
    let bytes = entry.path_bytes();
    (String::from_utf8_lossy(bytes).into_owned(), path_from_bytes(bytes))
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

// libgit2 stores paths as UTF-8 on other platforms.
#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// [`StatusProvider`] over a libgit2 repository handle.
pub struct GitStatusProvider {
    repo: Repository,
}

impl GitStatusProvider {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            repo: get_repo(path)?,
        })
    }
}

impl StatusProvider for GitStatusProvider {
    fn branch(&self) -> BranchInfo {
        get_branch_info(&self.repo)
    }

    fn statuses(&self, include_ignored: bool) -> Result<Vec<StatusEntry>> {
        get_status(&self.repo, include_ignored)
    }
}
