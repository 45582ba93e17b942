//! Path segment arithmetic relative to a filesystem root.
//!
//! Paths are `/`-separated strings as reported by the listing service. They are
//! never touched by `std::path`, since remote roots (`bucket/prefix`, `""`) are
//! not host paths.

/// Normalize a filesystem root: drop trailing separators, keeping a bare `/`.
pub fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() && root.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Segments of `path` below `root`, or `None` if `path` is not under `root`.
///
/// `root` must already be normalized. The root itself yields no segments.
pub fn relative_segments<'a>(root: &str, path: &'a str) -> Option<Vec<&'a str>> {
    let rest = if root.is_empty() {
        path
    } else if root == "/" {
        path.strip_prefix('/')?
    } else if path == root {
        ""
    } else {
        path.strip_prefix(root)?.strip_prefix('/')?
    };
    Some(rest.split('/').filter(|s| !s.is_empty()).collect())
}

/// Absolute path of `segment` under `parent`.
pub fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else if parent.ends_with('/') {
        format!("{}{}", parent, segment)
    } else {
        format!("{}/{}", parent, segment)
    }
}
