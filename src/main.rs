use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use crossterm::style::Stylize;
use git_backup::app::{self, Options};
use git_backup::paths::{is_valid_directory_path, normalize_lexically};
use git_backup::types::Filters;
use git_backup::{logging, update};
use std::path::{self, PathBuf};
use std::process;

/// Exit status for bad arguments or an unusable repository/backup path.
const INVALID_USAGE: i32 = -1;

#[derive(Parser)]
#[command(name = "git-backup")]
#[command(about = "Copy every changed file of a git working tree into a dated backup folder")]
#[command(version)]
struct Cli {
    /// Leave untracked files out
    #[arg(long)]
    skip_untracked: bool,
    /// Leave out files whose changes are only staged
    #[arg(long)]
    skip_staged: bool,
    /// Leave out newly added files
    #[arg(long)]
    skip_added: bool,
    /// Leave out deleted files
    #[arg(long)]
    skip_deleted: bool,
    /// Leave out modified files
    #[arg(long)]
    skip_modified: bool,
    /// Also back up files matched by .gitignore
    #[arg(long)]
    include_gitignored: bool,
    /// Release feed to check for a newer binary before backing up
    #[arg(long, env = "GIT_BACKUP_RELEASES_URL", value_name = "URL")]
    update_feed: Option<String>,
    /// More diagnostics on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Repository working tree to back up
    repo_path: PathBuf,
    /// Where the backup folder is created (default: inside the repository)
    backup_path: Option<PathBuf>,
}

impl Cli {
    fn filters(&self) -> Filters {
        Filters {
            skip_untracked: self.skip_untracked,
            skip_staged: self.skip_staged,
            skip_added: self.skip_added,
            skip_deleted: self.skip_deleted,
            skip_modified: self.skip_modified,
            include_ignored: self.include_gitignored,
        }
    }

    fn options(&self) -> Result<Options> {
        let repo_root = path::absolute(&self.repo_path)
            .map(|p| normalize_lexically(&p))
            .with_context(|| format!("Invalid repository path '{}'", self.repo_path.display()))?;
        app::validate_repo_root(&repo_root)?;

        let backup_parent = match &self.backup_path {
            Some(raw) => {
                let dir = path::absolute(raw)
                    .map(|p| normalize_lexically(&p))
                    .with_context(|| format!("Not a valid directory. '{}'", raw.display()))?;
                if !is_valid_directory_path(&dir) {
                    bail!("Not a valid directory. '{}'", dir.display());
                }
                Some(dir)
            }
            None => None,
        };

        Ok(Options {
            repo_root,
            backup_parent,
            filters: self.filters(),
            date: Local::now().date_naive(),
        })
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(INVALID_USAGE);
        }
    };
    logging::init(cli.verbose);

    if let Some(url) = &cli.update_feed {
        if try_self_update(url) {
            process::exit(0);
        }
    }

    let options = match cli.options() {
        Ok(options) => options,
        Err(e) => {
            println!("{e:#}");
            process::exit(INVALID_USAGE);
        }
    };

    // Failure is reported in the transcript only; the exit status stays 0.
    match app::run(&options) {
        Ok(summary) => {
            println!(
                "=> {} files reported, {} copied, {} no longer on disk.",
                summary.reported, summary.copied, summary.missing
            );
            println!("=> Report: {}", summary.report_path.display());
            println!("{}", "=> Backup completed.".green());
        }
        Err(e) => {
            println!("{}", format!("Error: {e:#}").red());
            println!("{}", "=> Backup failed.".red());
        }
    }
}

fn try_self_update(url: &str) -> bool {
    let asset_name = format!("git-backup{}", std::env::consts::EXE_SUFFIX);
    let applier = match update::ReplaceExecutable::for_current_exe() {
        Ok(applier) => applier,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "self-update unavailable");
            return false;
        }
    };
    match update::HttpReleaseFeed::new(url) {
        Ok(feed) => update::self_update(
            &feed,
            &applier,
            update::ReleaseVersion::current(),
            &asset_name,
        ),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "self-update unavailable");
            false
        }
    }
}
