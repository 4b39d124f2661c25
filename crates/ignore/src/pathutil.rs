use std::path::Path;

/// Strips `prefix` from `path`, if `path` starts with it. The comparison
/// is performed component-wise so that `strip_prefix("foo", "foobar")`
/// correctly reports no match (unlike a naive string strip).
pub fn strip_prefix<'a, P: AsRef<Path> + ?Sized>(
    prefix: &'a P,
    path: &'a Path,
) -> Option<&'a Path> {
    path.strip_prefix(prefix).ok()
}

/// Returns true if and only if the given path has exactly one component,
/// i.e. it looks like a bare file name with no directory separators.
pub fn is_file_name<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    path.file_name().map(|n| n.as_ref()) == Some(path.as_os_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn file_name_detection() {
        assert!(is_file_name("foo"));
        assert!(!is_file_name("foo/bar"));
        assert!(!is_file_name("/foo"));
    }

    #[test]
    fn strip() {
        assert_eq!(
            strip_prefix("/a/b", Path::new("/a/b/c")),
            Some(Path::new("c"))
        );
        assert_eq!(strip_prefix("/x", Path::new("/a/b")), None);
    }
}
