//! Resolve a CLI path argument into the list of source files to process.

use std::path::{Path, PathBuf};

/// If `path` is a file, return it as a single-element vector regardless of
/// its extension. If it is a directory, return the immediate (non-recursive)
/// entries whose extension matches `ext` case-insensitively, sorted by file
/// name so multi-file runs are deterministic.
pub fn files_with_extension(path: &Path, ext: &str) -> std::io::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_is_returned_unconditionally() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Main.jack");
        std::fs::write(&file, "").unwrap();

        let files = files_with_extension(&file, "vm").unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn directory_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.vm"), "").unwrap();
        std::fs::write(dir.path().join("a.vm"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("C.VM"), "").unwrap();

        let files = files_with_extension(dir.path(), "vm").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["C.VM", "a.vm", "b.vm"]);
    }

    #[test]
    fn directory_is_not_walked_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("nested.vm"), "").unwrap();

        let files = files_with_extension(dir.path(), "vm").unwrap();
        assert!(files.is_empty());
    }
}
