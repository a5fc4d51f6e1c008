//! Path classification.
//!
//! Paths are `/`-separated, optionally absolute. Nothing here touches the
//! engine: these helpers only look at the string.

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// The path of the root group.
pub const ROOT: &str = "/";

/// True iff `path` is exactly the root path.
pub fn is_root(path: &str) -> bool {
    path == ROOT
}

/// True iff `path` starts at the root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// True iff `path` contains a separator anywhere, including a leading one.
///
/// Existence checks treat such paths as possibly crossing intermediate
/// groups.
pub fn is_multi_segment(path: &str) -> bool {
    path.contains(SEPARATOR)
}

/// Non-empty segments of `path`, in order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// True iff intermediate groups must be created for `path`: the caller
/// asked for it and the path has more than one segment.
pub fn needs_intermediate_creation(path: &str, parents: bool) -> bool {
    parents && segments(path).nth(1).is_some()
}

/// Join a group path and a child name.
pub fn join(base: &str, name: &str) -> String {
    let name = name.trim_start_matches(SEPARATOR);
    if base.is_empty() {
        name.to_string()
    } else if base.ends_with(SEPARATOR) {
        format!("{}{}", base, name)
    } else {
        format!("{}{}{}", base, SEPARATOR, name)
    }
}
