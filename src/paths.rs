use std::path::{Component, Path, PathBuf};

/// Rewrites `\` separators to `/`, the form git reports paths in.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Renders a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether `path` can serve as a directory: either an existing directory, or
/// a non-existent path without a file extension and without NUL bytes.
pub fn is_valid_directory_path(path: &Path) -> bool {
    if path.as_os_str().is_empty() || path.to_string_lossy().contains('\0') {
        return false;
    }
    if path.is_dir() {
        return true;
    }
    !path.exists() && path.extension().is_none()
}

/// Resolves `.` and `..` without touching the filesystem. `..` at the root
/// stays at the root; leading `..` of a relative path are kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Longest shared leading run of components between two paths.
pub fn common_path(a: &Path, b: &Path) -> PathBuf {
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

/// Case-insensitive `starts_with` on `/`-normalized paths.
pub fn starts_with_ignore_case(path: &str, prefix: &str) -> bool {
    let path = normalize_separators(path);
    let prefix = normalize_separators(prefix);
    path.len() >= prefix.len()
        && path.is_char_boundary(prefix.len())
        && path[..prefix.len()].eq_ignore_ascii_case(&prefix)
}
