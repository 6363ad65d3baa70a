use bitflags::bitflags;
use std::fmt;
use std::path::PathBuf;

bitflags! {
    /// Version-control state of a single path, relative to HEAD and the index.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u16 {
        const INDEX_NEW = 1 << 0;
        const INDEX_MODIFIED = 1 << 1;
        const INDEX_DELETED = 1 << 2;
        const INDEX_RENAMED = 1 << 3;
        const INDEX_TYPECHANGE = 1 << 4;
        const WT_NEW = 1 << 5;
        const WT_MODIFIED = 1 << 6;
        const WT_DELETED = 1 << 7;
        const WT_RENAMED = 1 << 8;
        const WT_TYPECHANGE = 1 << 9;
        const CONFLICTED = 1 << 10;
        const IGNORED = 1 << 11;

        const INDEX = Self::INDEX_NEW.bits()
            | Self::INDEX_MODIFIED.bits()
            | Self::INDEX_DELETED.bits()
            | Self::INDEX_RENAMED.bits()
            | Self::INDEX_TYPECHANGE.bits();
        const WORKDIR = Self::WT_NEW.bits()
            | Self::WT_MODIFIED.bits()
            | Self::WT_DELETED.bits()
            | Self::WT_RENAMED.bits()
            | Self::WT_TYPECHANGE.bits();
    }
}

impl StatusFlags {
    /// True when the path only carries staged changes.
    pub fn is_staged_only(self) -> bool {
        self.intersects(Self::INDEX) && !self.intersects(Self::WORKDIR)
    }
}

impl From<git2::Status> for StatusFlags {
    fn from(status: git2::Status) -> Self {
        const MAPPING: [(git2::Status, StatusFlags); 12] = [
            (git2::Status::INDEX_NEW, StatusFlags::INDEX_NEW),
            (git2::Status::INDEX_MODIFIED, StatusFlags::INDEX_MODIFIED),
            (git2::Status::INDEX_DELETED, StatusFlags::INDEX_DELETED),
            (git2::Status::INDEX_RENAMED, StatusFlags::INDEX_RENAMED),
            (git2::Status::INDEX_TYPECHANGE, StatusFlags::INDEX_TYPECHANGE),
            (git2::Status::WT_NEW, StatusFlags::WT_NEW),
            (git2::Status::WT_MODIFIED, StatusFlags::WT_MODIFIED),
            (git2::Status::WT_DELETED, StatusFlags::WT_DELETED),
            (git2::Status::WT_RENAMED, StatusFlags::WT_RENAMED),
            (git2::Status::WT_TYPECHANGE, StatusFlags::WT_TYPECHANGE),
            (git2::Status::CONFLICTED, StatusFlags::CONFLICTED),
            (git2::Status::IGNORED, StatusFlags::IGNORED),
        ];

        MAPPING
            .iter()
            .filter(|(git, _)| status.contains(*git))
            .fold(StatusFlags::empty(), |acc, (_, flag)| acc | *flag)
    }
}

/// One path reported by the status provider, relative to the repository
/// root. `path` is the `/`-separated display form used for the report and
/// prefix matching; `rel_path` keeps the exact bytes for filesystem access.
/// Ignored directories keep their trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    pub rel_path: PathBuf,
    pub flags: StatusFlags,
}

impl StatusEntry {
    pub fn new(path: impl Into<String>, flags: StatusFlags) -> Self {
        let path = path.into();
        Self {
            rel_path: PathBuf::from(&path),
            path,
            flags,
        }
    }

    pub fn with_rel_path(path: impl Into<String>, rel_path: PathBuf, flags: StatusFlags) -> Self {
        Self {
            path: path.into(),
            rel_path,
            flags,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Added,
    Modified,
    Renamed,
    Deleted,
    TypeChanged,
    Untracked,
    Conflicted,
    Ignored,
}

impl FileStatus {
    /// Report section order.
    pub const ALL: [FileStatus; 8] = [
        FileStatus::Added,
        FileStatus::Modified,
        FileStatus::Renamed,
        FileStatus::Deleted,
        FileStatus::TypeChanged,
        FileStatus::Untracked,
        FileStatus::Conflicted,
        FileStatus::Ignored,
    ];

    pub fn banner(&self) -> &'static str {
        match self {
            FileStatus::Added => "ADDED FILES:",
            FileStatus::Modified => "MODIFIED FILES:",
            FileStatus::Renamed => "RENAMED FILES:",
            FileStatus::Deleted => "DELETED FILES:",
            FileStatus::TypeChanged => "TYPE CHANGED FILES:",
            FileStatus::Untracked => "UNTRACKED FILES:",
            FileStatus::Conflicted => "CONFLICTED FILES:",
            FileStatus::Ignored => "IGNORED FILES:",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileStatus::Added => "Added",
            FileStatus::Modified => "Modified",
            FileStatus::Renamed => "Renamed",
            FileStatus::Deleted => "Deleted",
            FileStatus::TypeChanged => "TypeChanged",
            FileStatus::Untracked => "Untracked",
            FileStatus::Conflicted => "Conflicted",
            FileStatus::Ignored => "Ignored",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchInfo {
    Branch(String),
    Detached(String),
    Unborn(String),
}

impl BranchInfo {
    pub fn display(&self) -> String {
        match self {
            BranchInfo::Branch(name) | BranchInfo::Unborn(name) => name.clone(),
            BranchInfo::Detached(hash) => format!("HEAD@{}", hash),
        }
    }
}

/// Which classified entries make it into the report and the backup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters {
    pub skip_untracked: bool,
    pub skip_staged: bool,
    pub skip_added: bool,
    pub skip_deleted: bool,
    pub skip_modified: bool,
    pub include_ignored: bool,
}

impl Filters {
    pub fn admits(&self, flags: StatusFlags, status: FileStatus) -> bool {
        if self.skip_staged && flags.is_staged_only() {
            return false;
        }
        match status {
            FileStatus::Untracked => !self.skip_untracked,
            FileStatus::Added => !self.skip_added,
            FileStatus::Deleted => !self.skip_deleted,
            FileStatus::Modified => !self.skip_modified,
            FileStatus::Ignored => self.include_ignored,
            FileStatus::Renamed | FileStatus::TypeChanged | FileStatus::Conflicted => true,
        }
    }
}
