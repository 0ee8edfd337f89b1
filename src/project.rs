use std::path::{Path, PathBuf};

use tracing::debug;

use crate::manifest::ManifestStore;

/// A project directory and the manifest that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub root: PathBuf,
    pub store: ManifestStore,
}

impl Project {
    /// Finds the project owning `dir` by walking up until `relative_manifest` exists. Falls back
    /// to `dir` itself when no parent has one; the store then reports the manifest as missing.
    pub fn locate(dir: &Path, relative_manifest: &Path) -> Project {
        let root = find_project_root(dir, relative_manifest).unwrap_or_else(|| dir.to_path_buf());
        let manifest_file_path = root.join(relative_manifest);
        debug!("Using manifest {}", manifest_file_path.display());

        Project {
            root,
            store: ManifestStore::new(manifest_file_path),
        }
    }

    /// Uses an explicit manifest file, skipping the search.
    pub fn with_manifest(manifest_file_path: PathBuf) -> Project {
        let root = manifest_file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Project {
            root,
            store: ManifestStore::new(manifest_file_path),
        }
    }
}

fn find_project_root(starting_dir_path: &Path, relative_manifest: &Path) -> Option<PathBuf> {
    let mut search_path = Some(starting_dir_path);

    while let Some(path) = search_path {
        if path.join(relative_manifest).is_file() {
            return Some(path.to_path_buf());
        }
        search_path = path.parent();
    }

    None
}
