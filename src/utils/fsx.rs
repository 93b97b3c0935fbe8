//! Filesystem helpers shared by pipeline tasks.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
pub const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Collect all files from a directory recursively, sorted for determinism.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Collect files in `dir` (recursive) whose extension matches one of `exts`.
///
/// Extensions are compared ASCII case-insensitively, without the dot.
pub fn collect_files_with_ext(dir: &Path, exts: &[&str]) -> Vec<PathBuf> {
    collect_all_files(dir)
        .into_iter()
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| exts.iter().any(|want| e.eq_ignore_ascii_case(want)))
        })
        .collect()
}

/// Copy `src` to `dst`, creating parent directories as needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::copy(src, dst)
        .with_context(|| format!("Failed to copy {} -> {}", src.display(), dst.display()))?;
    Ok(())
}

/// Write `data` to `dst`, creating parent directories as needed.
pub fn write_file(dst: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(dst, data).with_context(|| format!("Failed to write {}", dst.display()))?;
    Ok(())
}

/// Mirror a source-relative path into the output tree.
///
/// `/proj/source/img/a.png` with roots `/proj/source` -> `/proj/build`
/// becomes `/proj/build/img/a.png`. Paths outside the source root are an
/// error, never silently flattened.
pub fn rebase(path: &Path, from: &Path, to: &Path) -> Result<PathBuf> {
    let rel = path
        .strip_prefix(from)
        .with_context(|| format!("{} is outside {}", path.display(), from.display()))?;
    Ok(to.join(rel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collect_all_files_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join(".DS_Store"), "junk").unwrap();
        fs::write(dir.path().join("sub/c.txt"), "c").unwrap();

        let files = collect_all_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub/c.txt"]);
    }

    #[test]
    fn test_collect_files_with_ext() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.PNG"), "").unwrap();
        fs::write(dir.path().join("b.jpg"), "").unwrap();
        fs::write(dir.path().join("c.svg"), "").unwrap();

        let files = collect_files_with_ext(dir.path(), &["png", "jpg"]);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("deep/nested/dst.txt");
        fs::write(&src, "payload").unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst).unwrap(), "payload");
    }

    #[test]
    fn test_rebase() {
        let out = rebase(
            Path::new("/proj/source/img/a.png"),
            Path::new("/proj/source"),
            Path::new("/proj/build"),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/proj/build/img/a.png"));

        assert!(
            rebase(
                Path::new("/elsewhere/a.png"),
                Path::new("/proj/source"),
                Path::new("/proj/build"),
            )
            .is_err()
        );
    }
}
