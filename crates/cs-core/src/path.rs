//! Task-path construction and prefix enumeration.
//!
//! A task's path is the colon-joined sequence of names from the tree root to
//! the task itself (`"run:analysis:pairs"`). Configuration override search
//! walks the path's prefixes from most specific to least specific.

/// Separator between path segments.
pub const PATH_SEPARATOR: char = ':';

/// Join a parent path and a child name into the child's full path.
///
/// An empty parent (detached root) yields just the name.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{name}")
    }
}

/// Enumerate prefixes of `path`, most specific first.
///
/// `"a:b:c"` yields `["a:b:c", "a:b", "a"]`. The full path is always the
/// first element; the root-only prefix is always the last.
pub fn prefixes(path: &str) -> impl Iterator<Item = &str> {
    let mut end = Some(path.len());
    std::iter::from_fn(move || {
        let e = end?;
        let prefix = &path[..e];
        end = path[..e].rfind(PATH_SEPARATOR);
        Some(prefix)
    })
}

/// Depth of a path: number of ancestors (root has depth 0).
pub fn depth(path: &str) -> usize {
    path.matches(PATH_SEPARATOR).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_root_and_nested() {
        assert_eq!(join("", "run"), "run");
        assert_eq!(join("run", "analysis"), "run:analysis");
        assert_eq!(join("run:analysis", "pairs"), "run:analysis:pairs");
    }

    #[test]
    fn prefixes_most_specific_first() {
        let p: Vec<_> = prefixes("a:b:c").collect();
        assert_eq!(p, vec!["a:b:c", "a:b", "a"]);
    }

    #[test]
    fn prefixes_of_root() {
        let p: Vec<_> = prefixes("root").collect();
        assert_eq!(p, vec!["root"]);
    }

    #[test]
    fn depth_counts_ancestors() {
        assert_eq!(depth("root"), 0);
        assert_eq!(depth("a:b"), 1);
        assert_eq!(depth("a:b:c"), 2);
    }
}
