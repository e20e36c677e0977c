use std::path::{Component, Path, PathBuf};

use crate::error::UtilError;
use crate::Result;

/// A forward-slash path relative to a working-copy root.
///
/// Scenario steps only ever touch paths inside the working copy, so a
/// `WcPath` refuses absolute paths and `..` components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WcPath<'a>(&'a str);

impl<'a> WcPath<'a> {
    pub fn new(path: &'a str) -> Self {
        WcPath(path)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Resolve against `root`, rejecting paths that would escape it.
    pub fn resolve(&self, root: &Path) -> Result<PathBuf> {
        if self.0.is_empty() {
            return Err(UtilError::Path("empty working-copy path".into()));
        }
        let rel = Path::new(self.0);
        for component in rel.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(UtilError::Path(format!(
                        "'{}' escapes the working copy",
                        self.0
                    )))
                }
            }
        }
        Ok(root.join(rel))
    }
}

impl std::fmt::Display for WcPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Build a `file://` URL for a local repository path.
///
/// The path must be absolute; relative paths are made absolute against the
/// current directory first.
pub fn file_url(path: &Path) -> Result<String> {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let text = abs
        .to_str()
        .ok_or_else(|| UtilError::Path(format!("non-UTF-8 path: {}", abs.display())))?;
    let mut url = String::from("file://");
    for c in text.chars() {
        match c {
            ' ' => url.push_str("%20"),
            '%' => url.push_str("%25"),
            '#' => url.push_str("%23"),
            '?' => url.push_str("%3F"),
            '\\' => url.push('/'),
            c => url.push(c),
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative() {
        let root = Path::new("/work/wc/props");
        assert_eq!(
            WcPath::new("dir3/subdir/file1").resolve(root).unwrap(),
            PathBuf::from("/work/wc/props/dir3/subdir/file1")
        );
    }

    #[test]
    fn reject_parent_and_absolute() {
        let root = Path::new("/work/wc");
        assert!(WcPath::new("../outside").resolve(root).is_err());
        assert!(WcPath::new("dir1/../../x").resolve(root).is_err());
        assert!(WcPath::new("/etc/passwd").resolve(root).is_err());
        assert!(WcPath::new("").resolve(root).is_err());
    }

    #[test]
    fn file_url_absolute() {
        assert_eq!(
            file_url(Path::new("/tmp/repos/props")).unwrap(),
            "file:///tmp/repos/props"
        );
    }

    #[test]
    fn file_url_escapes_spaces() {
        assert_eq!(
            file_url(Path::new("/tmp/my repos")).unwrap(),
            "file:///tmp/my%20repos"
        );
    }

    #[test]
    fn file_url_makes_relative_absolute() {
        let url = file_url(Path::new("repos/x")).unwrap();
        assert!(url.starts_with("file:///"));
        assert!(url.ends_with("/repos/x"));
    }
}
