use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Absolute project root: the given path, or the current directory.
pub fn resolve_project_root(path: Option<&Path>) -> Result<PathBuf> {
    let root = match path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("Project root {} does not exist", root.display()))
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_project_root_canonicalizes() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("app");
        std::fs::create_dir(&nested).unwrap();

        let resolved = resolve_project_root(Some(&nested.join("..").join("app"))).unwrap();
        assert_eq!(resolved, nested.canonicalize().unwrap());
    }

    #[test]
    fn test_missing_project_root_is_an_error() {
        let err = resolve_project_root(Some(Path::new("/no/such/project/root"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_against() {
        assert_eq!(
            resolve_against(Path::new("/work"), Path::new("target/reflect")),
            PathBuf::from("/work/target/reflect")
        );
        assert_eq!(
            resolve_against(Path::new("/work"), Path::new("/bin/reflect")),
            PathBuf::from("/bin/reflect")
        );
    }
}
