use crate::survey::*;

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn ensure_exists(path: &str) -> BSurveyResult<()> {
    if !Path::new(path).exists() {
        return Err(Box::new(SurveyError::MissingInput {
            path: path.to_string(),
        }));
    }
    Ok(())
}

/// Paths in a configuration file are relative to the directory of this file.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    [root, Path::new(path)].iter().collect()
}

/// The directory given with `--save`, created if needed.
///
/// An extension in the last component is dropped: `out.csv` becomes `out`.
pub fn output_root(save: &str) -> BSurveyResult<PathBuf> {
    ensure_dir(&Path::new(save).with_extension(""))
}

/// Creates the directory as it is named.
pub fn ensure_dir(dir: &Path) -> BSurveyResult<PathBuf> {
    fs::create_dir_all(dir).context(CreatingOutputDirSnafu {
        path: dir.display().to_string(),
    })?;
    debug!("ensure_dir: {:?}", dir);
    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_relative_and_absolute() {
        let root = Path::new("/data/survey");
        assert_eq!(
            resolve_path(root, "a/b.csv"),
            PathBuf::from("/data/survey/a/b.csv")
        );
        assert_eq!(resolve_path(root, "/tmp/b.csv"), PathBuf::from("/tmp/b.csv"));
        assert_eq!(resolve_path(Path::new(""), "b.csv"), PathBuf::from("b.csv"));
    }

    #[test]
    fn output_root_drops_extension() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        let root = output_root(base.join("tables.csv").to_str().unwrap()).unwrap();
        assert_eq!(root, base.join("tables"));
        assert!(root.is_dir());
        // Creating it again is fine.
        output_root(root.to_str().unwrap()).unwrap();
    }

    #[test]
    fn ensure_dir_keeps_extension() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("study.2024");
        let root = ensure_dir(&target).unwrap();
        assert_eq!(root, target);
        assert!(root.is_dir());
        assert!(!dir.path().join("study").exists());
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name(Path::new("/a/b/c.csv")), "c.csv");
        assert_eq!(simplify_file_name(Path::new("c.csv")), "c.csv");
    }
}
