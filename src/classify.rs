use crate::types::{FileStatus, StatusFlags};

/// Checked top to bottom; the first matching flag wins. Workdir rules come
/// before index rules so a staged-then-edited file reads as its working
/// tree state.
const RULES: [(StatusFlags, FileStatus); 12] = [
    (StatusFlags::WT_NEW, FileStatus::Untracked),
    (StatusFlags::WT_MODIFIED, FileStatus::Modified),
    (StatusFlags::WT_RENAMED, FileStatus::Renamed),
    (StatusFlags::WT_DELETED, FileStatus::Deleted),
    (StatusFlags::WT_TYPECHANGE, FileStatus::TypeChanged),
    (StatusFlags::INDEX_NEW, FileStatus::Added),
    (StatusFlags::INDEX_MODIFIED, FileStatus::Modified),
    (StatusFlags::INDEX_RENAMED, FileStatus::Renamed),
    (StatusFlags::INDEX_DELETED, FileStatus::Deleted),
    (StatusFlags::INDEX_TYPECHANGE, FileStatus::TypeChanged),
    (StatusFlags::CONFLICTED, FileStatus::Conflicted),
    (StatusFlags::IGNORED, FileStatus::Ignored),
];

/// Collapses a status bitset into one display category. `None` means the
/// path is unaltered and takes no part in the report or the backup.
pub fn classify(flags: StatusFlags) -> Option<FileStatus> {
    RULES
        .iter()
        .find(|(flag, _)| flags.contains(*flag))
        .map(|(_, status)| *status)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKDIR_RULES: [(StatusFlags, FileStatus); 5] = [
        (StatusFlags::WT_NEW, FileStatus::Untracked),
        (StatusFlags::WT_MODIFIED, FileStatus::Modified),
        (StatusFlags::WT_RENAMED, FileStatus::Renamed),
        (StatusFlags::WT_DELETED, FileStatus::Deleted),
        (StatusFlags::WT_TYPECHANGE, FileStatus::TypeChanged),
    ];

    #[test]
    fn empty_is_unaltered() {
        assert_eq!(classify(StatusFlags::empty()), None);
    }

    #[test]
    fn index_only_flags() {
        assert_eq!(classify(StatusFlags::INDEX_NEW), Some(FileStatus::Added));
        assert_eq!(classify(StatusFlags::INDEX_MODIFIED), Some(FileStatus::Modified));
        assert_eq!(classify(StatusFlags::INDEX_RENAMED), Some(FileStatus::Renamed));
        assert_eq!(classify(StatusFlags::INDEX_DELETED), Some(FileStatus::Deleted));
        assert_eq!(
            classify(StatusFlags::INDEX_TYPECHANGE),
            Some(FileStatus::TypeChanged)
        );
    }

    #[test]
    fn staged_new_then_edited_is_modified() {
        let flags = StatusFlags::INDEX_NEW | StatusFlags::WT_MODIFIED;
        assert_eq!(classify(flags), Some(FileStatus::Modified));
    }

    #[test]
    fn staged_new_then_deleted_is_deleted() {
        let flags = StatusFlags::INDEX_NEW | StatusFlags::WT_DELETED;
        assert_eq!(classify(flags), Some(FileStatus::Deleted));
    }

    #[test]
    fn workdir_flag_wins_over_any_index_combination() {
        // Every subset of the index flags, under every single workdir flag.
        for bits in 0..32u16 {
            let index = StatusFlags::from_bits_truncate(bits) & StatusFlags::INDEX;
            for (workdir, expected) in WORKDIR_RULES {
                assert_eq!(classify(index | workdir), Some(expected), "{:?}", index | workdir);
            }
        }
    }

    #[test]
    fn workdir_order_is_fixed() {
        let flags = StatusFlags::WT_MODIFIED | StatusFlags::WT_DELETED | StatusFlags::WT_TYPECHANGE;
        assert_eq!(classify(flags), Some(FileStatus::Modified));

        let flags = StatusFlags::WT_RENAMED | StatusFlags::WT_DELETED;
        assert_eq!(classify(flags), Some(FileStatus::Renamed));
    }

    #[test]
    fn conflict_and_ignored_rank_last() {
        assert_eq!(classify(StatusFlags::CONFLICTED), Some(FileStatus::Conflicted));
        assert_eq!(classify(StatusFlags::IGNORED), Some(FileStatus::Ignored));
        assert_eq!(
            classify(StatusFlags::CONFLICTED | StatusFlags::INDEX_MODIFIED),
            Some(FileStatus::Modified)
        );
    }
}
