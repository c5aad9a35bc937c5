//! Enumeration of golden fixtures.

use crate::error::{ContractsError, display_path};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A fixture found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenPath {
    /// Path relative to the base passed to [`discover_goldens`], `/`-separated.
    pub rel_path: String,
    pub abs_path: PathBuf,
}

/// All `*.json` files below `root`, sorted by their path relative to `base`.
///
/// A missing `root` yields no goldens. Any directory that exists but cannot
/// be read aborts discovery.
pub fn discover_goldens(root: &Path, base: &Path) -> Result<Vec<GoldenPath>, ContractsError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(ContractsError::Traverse {
                path: display_path(root),
                source: std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
            });
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::info!(root = %display_path(root), "goldens directory absent");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(ContractsError::Traverse {
                path: display_path(root),
                source,
            });
        }
    }

    let mut files = Vec::new();
    collect_json_files(root, &mut files)?;
    let mut goldens: Vec<GoldenPath> = files
        .into_iter()
        .map(|abs_path| GoldenPath {
            rel_path: relative_display(&abs_path, base),
            abs_path,
        })
        .collect();
    goldens.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(goldens)
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ContractsError> {
    let traverse = |source| ContractsError::Traverse {
        path: display_path(dir),
        source,
    };
    for entry in fs::read_dir(dir).map_err(traverse)? {
        let entry = entry.map_err(traverse)?;
        let path = entry.path();
        // Follows symlinks, so linked fixture directories are included.
        let meta = fs::metadata(&path).map_err(|source| ContractsError::Traverse {
            path: display_path(&path),
            source,
        })?;
        if meta.is_dir() {
            collect_json_files(&path, out)?;
        } else if meta.is_file() && has_json_suffix(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_json_suffix(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn relative_display(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_root(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "goldcheck-discovery-{prefix}-{}-{unique}",
            std::process::id()
        ))
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, b"{}\n").expect("write");
    }

    #[test]
    fn missing_root_yields_no_goldens() {
        let base = temp_root("missing");
        let goldens = discover_goldens(&base.join("goldens"), &base).expect("missing root is ok");
        assert!(goldens.is_empty());
    }

    #[test]
    fn discovers_recursively_in_lexicographic_order() {
        let base = temp_root("order");
        let root = base.join("goldens");
        // Created out of order on purpose.
        for rel in [
            "zeta.json",
            "e2e/Script.json",
            "Script.json",
            "e2e/AssetManifest.json",
            "a-b.json",
            "notes.txt",
            "e2e/deep/ShotList.json",
            "e2e/README",
        ] {
            touch(&root.join(rel));
        }
        let goldens = discover_goldens(&root, &base).expect("discovery should succeed");
        let rels: Vec<&str> = goldens.iter().map(|g| g.rel_path.as_str()).collect();
        assert_eq!(
            rels,
            vec![
                "goldens/Script.json",
                "goldens/a-b.json",
                "goldens/e2e/AssetManifest.json",
                "goldens/e2e/Script.json",
                "goldens/e2e/deep/ShotList.json",
                "goldens/zeta.json",
            ]
        );
        assert!(goldens.iter().all(|g| g.abs_path.is_file()));
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn root_that_is_a_file_is_an_error() {
        let base = temp_root("file");
        touch(&base.join("goldens"));
        let err = discover_goldens(&base.join("goldens"), &base).expect_err("file root");
        assert!(err.to_string().starts_with("failed to traverse "), "{err}");
        let _ = fs::remove_dir_all(&base);
    }
}
