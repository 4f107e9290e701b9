//! Locator classification and canonical source names.
//!
//! A locator is the argument of an include directive. Classification picks
//! filesystem or HTTP access; canonicalization produces the name used for
//! cycle detection and for line attribution in nested error messages.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A classified content locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Filesystem path, resolved relative to the including document.
    Local(PathBuf),
    /// HTTP(S) address.
    Remote(String),
}

impl Locator {
    /// Classify an include argument against the document it appears in.
    ///
    /// Only the first whitespace-separated token is considered; trailing
    /// text is ignored. A token with an `http://` or `https://` scheme is
    /// remote. Anything else is a path resolved against the directory of
    /// `base_source_name` — or joined onto the base URL when the including
    /// document is itself remote, so relative includes keep working inside
    /// fetched content.
    #[must_use]
    pub fn classify(argument: &str, base_source_name: &str) -> Self {
        let token = argument.split_whitespace().next().unwrap_or("");

        if is_remote(token) {
            return Self::Remote(token.to_owned());
        }
        if is_remote(base_source_name) {
            return Self::Remote(join_url(base_source_name, token));
        }

        let path = Path::new(token);
        if path.is_absolute() {
            Self::Local(path.to_path_buf())
        } else {
            let base_dir = Path::new(base_source_name)
                .parent()
                .unwrap_or_else(|| Path::new(""));
            Self::Local(base_dir.join(path))
        }
    }

    /// Canonical name for cycle detection and diagnostics.
    ///
    /// Local paths are absolutized against the working directory and
    /// normalized lexically (no symlink resolution, so a name exists even
    /// for files that do not). Remote locators are already canonical.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Local(path) => canonical_path(path),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// Canonical form of a source name as passed to the entry point.
///
/// Applies the same rules as [`Locator::canonical_name`], so a document
/// reached by two spellings of the same path is recognized as one document.
#[must_use]
pub fn canonical_source_name(name: &str) -> String {
    if is_remote(name) {
        name.to_owned()
    } else {
        canonical_path(Path::new(name))
    }
}

fn is_remote(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://")
}

fn canonical_path(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    normalize(&absolute).to_string_lossy().into_owned()
}

/// Lexical normalization: drops `.` segments and folds `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a schemeless locator against a remote base URL.
///
/// Replaces the final path segment of the base, folding `.` and `..`
/// segments of the relative part.
fn join_url(base: &str, relative: &str) -> String {
    let scheme_end = base.find("://").map_or(0, |i| i + 3);
    let (origin, path) = match base[scheme_end..].find('/') {
        Some(i) => base.split_at(scheme_end + i),
        None => (base, ""),
    };

    if let Some(absolute) = relative.strip_prefix('/') {
        return format!("{origin}/{absolute}");
    }

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    // the base's own document name is replaced by the relative part
    segments.pop();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("{origin}/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_relative_to_base_dir() {
        let locator = Locator::classify("./child.txt", "/docs/parent.txt");
        assert_eq!(locator, Locator::Local(PathBuf::from("/docs/./child.txt")));
        assert_eq!(locator.canonical_name(), "/docs/child.txt");
    }

    #[test]
    fn test_classify_ignores_trailing_text() {
        let locator = Locator::classify("./child.txt # the appendix", "/docs/parent.txt");
        assert_eq!(locator.canonical_name(), "/docs/child.txt");
    }

    #[test]
    fn test_classify_absolute_path() {
        let locator = Locator::classify("/etc/motd", "/docs/parent.txt");
        assert_eq!(locator, Locator::Local(PathBuf::from("/etc/motd")));
    }

    #[test]
    fn test_classify_remote() {
        let locator = Locator::classify("https://example.com/a.txt", "/docs/parent.txt");
        assert_eq!(
            locator,
            Locator::Remote("https://example.com/a.txt".to_owned())
        );
    }

    #[test]
    fn test_classify_relative_against_remote_base() {
        let locator = Locator::classify("b.txt", "https://example.com/docs/a.txt");
        assert_eq!(
            locator,
            Locator::Remote("https://example.com/docs/b.txt".to_owned())
        );
    }

    #[test]
    fn test_classify_parent_against_remote_base() {
        let locator = Locator::classify("../shared/b.txt", "https://example.com/docs/a.txt");
        assert_eq!(
            locator,
            Locator::Remote("https://example.com/shared/b.txt".to_owned())
        );
    }

    #[test]
    fn test_classify_rooted_against_remote_base() {
        let locator = Locator::classify("/b.txt", "https://example.com/docs/deep/a.txt");
        assert_eq!(locator, Locator::Remote("https://example.com/b.txt".to_owned()));
    }

    #[test]
    fn test_canonical_name_folds_dot_dot() {
        let locator = Locator::Local(PathBuf::from("/docs/sub/../child.txt"));
        assert_eq!(locator.canonical_name(), "/docs/child.txt");
    }

    #[test]
    fn test_canonical_source_name_remote_passthrough() {
        assert_eq!(
            canonical_source_name("https://example.com/a.txt"),
            "https://example.com/a.txt"
        );
    }

    #[test]
    fn test_canonical_source_name_relative_is_absolute() {
        let name = canonical_source_name("data/root.txt");
        assert!(Path::new(&name).is_absolute());
        assert!(name.ends_with("data/root.txt"));
    }

    #[test]
    fn test_normalize_keeps_root() {
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("/a/./b")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Locator::Remote("https://example.com/x".to_owned()).to_string(),
            "https://example.com/x"
        );
        assert_eq!(
            Locator::Local(PathBuf::from("/tmp/x.txt")).to_string(),
            "/tmp/x.txt"
        );
    }
}
