use crate::classify::classify;
use crate::copier::{copy_entry, CopyOutcome};
use crate::git::{GitStatusProvider, StatusProvider};
use crate::plan::BackupPlan;
use crate::report::ChangeReport;
use crate::types::{FileStatus, Filters, StatusEntry};
use anyhow::{bail, Result};
use chrono::NaiveDate;
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything a backup run needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub repo_root: PathBuf,
    /// Directory that receives the `Backup_*` folder; the repository root
    /// when unset.
    pub backup_parent: Option<PathBuf>,
    pub filters: Filters,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    pub backup_root: PathBuf,
    pub report_path: PathBuf,
    pub reported: usize,
    pub copied: usize,
    pub missing: usize,
}

/// Fails when `repo_root` has no `.git` entry.
pub fn validate_repo_root(repo_root: &Path) -> Result<()> {
    if !repo_root.join(".git").exists() {
        bail!(
            "Could not find .git directory at given path. '{}'",
            repo_root.display()
        );
    }
    Ok(())
}

pub fn run(options: &Options) -> Result<BackupSummary> {
    let provider = GitStatusProvider::open(&options.repo_root)?;
    run_with(&provider, options)
}

/// Plan, query, report, copy. The first error ends the run; files copied
/// before it stay in place.
pub fn run_with(provider: &impl StatusProvider, options: &Options) -> Result<BackupSummary> {
    let branch = provider.branch().display();
    let plan = BackupPlan::create(
        &options.repo_root,
        options.backup_parent.as_deref(),
        &branch,
        options.date,
    )?;

    println!("=> Repo Directory: {}", plan.repo_root.display());
    println!("=> Backup Directory: {}", plan.backup_root.display());
    println!("{}", "=> Backup Started...".cyan());

    let entries = provider.statuses(options.filters.include_ignored)?;
    let selected = select_entries(&plan, &options.filters, entries);
    info!(branch = %branch, selected = selected.len(), "status classified");

    let mut report = ChangeReport::new(branch);
    for (status, entry) in &selected {
        report.push(*status, entry.path.as_str());
    }
    report.write_to(&plan.report_path)?;
    if report.is_empty() {
        info!("no altered files, nothing to copy");
    }

    let mut copied = 0;
    let mut missing = 0;
    for (status, entry) in &selected {
        match copy_entry(&plan.repo_root, &plan.backup_root, &entry.rel_path)? {
            CopyOutcome::File => {
                copied += 1;
                println!("{} {} file: {}", "+ Copied".green(), status, entry.path);
            }
            CopyOutcome::Directory { files } => {
                copied += files;
                println!(
                    "{} {} directory: {} ({} files)",
                    "+ Copied".green(),
                    status,
                    entry.path,
                    files
                );
            }
            CopyOutcome::Missing => missing += 1,
        }
    }

    Ok(BackupSummary {
        backup_root: plan.backup_root,
        report_path: plan.report_path,
        reported: report.len(),
        copied,
        missing,
    })
}

/// Drops unaltered entries, backup output and whatever `filters` rejects,
/// keeping provider order.
pub fn select_entries(
    plan: &BackupPlan,
    filters: &Filters,
    entries: Vec<StatusEntry>,
) -> Vec<(FileStatus, StatusEntry)> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let status = classify(entry.flags)?;
            if plan.excludes(&entry.path) {
                debug!(path = %entry.path, "inside backup output, skipping");
                return None;
            }
            if !filters.admits(entry.flags, status) {
                debug!(path = %entry.path, %status, "filtered out");
                return None;
            }
            Some((status, entry))
        })
        .collect()
}
