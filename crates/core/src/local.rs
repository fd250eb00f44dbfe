//! Local filesystem listing
//!
//! Walks a directory tree lazily with `walkdir`, yielding regular files
//! only. Symlinks below the root are never followed.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::traits::{LocalFiles, LocalLister};

/// `LocalLister` backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl FsLister {
    pub fn new() -> Self {
        Self
    }
}

impl LocalLister for FsLister {
    fn list_files<'a>(&'a self, root: &Path) -> Result<LocalFiles<'a>> {
        if !root.is_dir() {
            return Err(Error::ListingFailure(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        tracing::debug!(root = %root.display(), "Walking local directory");

        let files = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(entry) => {
                    if entry.path_is_symlink() {
                        tracing::debug!(path = %entry.path().display(), "Skipping symlink");
                    }
                    None
                }
                Err(e) => Some(Err(Error::ListingFailure(e.to_string()))),
            });

        Ok(Box::new(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, relative.as_bytes()).unwrap();
    }

    fn relative_set(root: &Path, lister: &FsLister) -> BTreeSet<String> {
        lister
            .list_files(root)
            .unwrap()
            .map(|p| {
                p.unwrap()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_lists_nested_files_only() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "dir/file1.txt");
        touch(temp.path(), "dir/file2.txt");
        touch(temp.path(), "file3.txt");
        std::fs::create_dir_all(temp.path().join("empty/nested")).unwrap();

        let files = relative_set(temp.path(), &FsLister::new());
        let expected: BTreeSet<String> = ["dir/file1.txt", "dir/file2.txt", "file3.txt"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_includes_hidden_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".hidden/config");
        touch(temp.path(), ".env");

        let files = relative_set(temp.path(), &FsLister::new());
        assert!(files.contains(".env"));
        assert!(files.contains(".hidden/config"));
    }

    #[test]
    fn test_root_with_glob_metacharacters() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("data [2024]");
        touch(&root, "a.txt");

        let files = relative_set(&root, &FsLister::new());
        assert_eq!(files.len(), 1);
        assert!(files.contains("a.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        touch(&root, "a.txt");
        touch(temp.path(), "other/secret.txt");
        std::os::unix::fs::symlink(temp.path().join("other"), root.join("link")).unwrap();
        std::os::unix::fs::symlink(&root, root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root.join("a.txt"), root.join("alias.txt")).unwrap();

        let files = relative_set(&root, &FsLister::new());
        let expected: BTreeSet<String> = ["a.txt".to_string()].into_iter().collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_walk_order_is_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.txt");
        touch(temp.path(), "a/z.txt");
        touch(temp.path(), "c.txt");

        let files: Vec<_> = FsLister::new()
            .list_files(temp.path())
            .unwrap()
            .map(|p| p.unwrap().strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a/z.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("c.txt")
            ]
        );
    }

    #[test]
    fn test_missing_root_is_listing_failure() {
        let temp = TempDir::new().unwrap();
        let lister = FsLister::new();
        let result = lister.list_files(&temp.path().join("nope"));
        assert!(matches!(result, Err(Error::ListingFailure(_))));
    }
}
