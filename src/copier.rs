use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    File,
    /// Directory entry; only its immediate child files were copied.
    Directory { files: usize },
    /// The source is gone from disk (deleted file, dangling symlink).
    Missing,
}

/// Mirrors `rel_path` from `src_root` into `dest_root`, creating parent
/// directories and overwriting an existing destination.
pub fn copy_entry(src_root: &Path, dest_root: &Path, rel_path: &Path) -> Result<CopyOutcome> {
    let source = src_root.join(rel_path);
    let destination = dest_root.join(rel_path);

    let metadata = match fs::metadata(&source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %rel_path.display(), "source no longer on disk, skipping");
            return Ok(CopyOutcome::Missing);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to inspect {}", source.display()));
        }
    };

    if metadata.is_dir() {
        let files = copy_shallow(&source, &destination)?;
        return Ok(CopyOutcome::Directory { files });
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::copy(&source, &destination).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            source.display(),
            destination.display()
        )
    })?;
    Ok(CopyOutcome::File)
}

/// Copies the files directly inside `source`; subdirectories are not entered.
fn copy_shallow(source: &Path, destination: &Path) -> Result<usize> {
    fs::create_dir_all(destination)
        .with_context(|| format!("Failed to create directory {}", destination.display()))?;

    let mut copied = 0;
    for child in fs::read_dir(source)
        .with_context(|| format!("Failed to read directory {}", source.display()))?
    {
        let child = child?;
        if !child.path().is_file() {
            continue;
        }
        let target = destination.join(child.file_name());
        fs::copy(child.path(), &target).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                child.path().display(),
                target.display()
            )
        })?;
        copied += 1;
    }
    Ok(copied)
}
