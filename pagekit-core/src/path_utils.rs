//! Shared path utilities for file selection and serving.

use std::path::{Component, Path, PathBuf};

/// Returns `file_path` relative to `base`, or `None` when it lies outside.
pub fn relative_to(file_path: &Path, base: &Path) -> Option<PathBuf> {
    file_path
        .strip_prefix(base)
        .ok()
        .map(|p| p.to_path_buf())
        .filter(|p| !p.as_os_str().is_empty())
}

/// Sass partials (`_name.scss`) are compiled only through their importers.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('_'))
        .unwrap_or(false)
}

/// Renders a relative path as a URL path with forward slashes and a leading `/`.
pub fn to_url_path(relative: &Path) -> String {
    let mut url = String::new();
    for component in relative.components() {
        if let Component::Normal(name) = component {
            url.push('/');
            url.push_str(&name.to_string_lossy());
        }
    }
    if url.is_empty() {
        url.push('/');
    }
    url
}

/// Joins a request path onto `root`, refusing anything that would escape it.
///
/// Returns `None` for `..` segments or absolute components.
pub fn safe_join(root: &Path, request: &str) -> Option<PathBuf> {
    let mut joined = root.to_path_buf();
    for segment in request.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains(':') => return None,
            s => joined.push(s),
        }
    }
    Some(joined)
}

/// Lowercased file extension, if any.
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to() {
        let rel = relative_to(Path::new("/p/src/a/b.scss"), Path::new("/p/src")).unwrap();
        assert_eq!(rel, PathBuf::from("a/b.scss"));
        assert!(relative_to(Path::new("/p/other/x"), Path::new("/p/src")).is_none());
        assert!(relative_to(Path::new("/p/src"), Path::new("/p/src")).is_none());
    }

    #[test]
    fn test_partials() {
        assert!(is_partial(Path::new("assets/styles/_vars.scss")));
        assert!(!is_partial(Path::new("assets/styles/main.scss")));
    }

    #[test]
    fn test_safe_join_rejects_parent_segments() {
        let root = Path::new("/srv");
        assert_eq!(
            safe_join(root, "/assets/main.css").unwrap(),
            PathBuf::from("/srv/assets/main.css")
        );
        assert!(safe_join(root, "/../etc/passwd").is_none());
    }

    #[test]
    fn test_url_path() {
        assert_eq!(to_url_path(Path::new("assets/styles/main.css")), "/assets/styles/main.css");
        assert_eq!(to_url_path(Path::new("")), "/");
    }
}
