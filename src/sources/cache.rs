//! Local artifact cache.
//!
//! Mirrors the repository layout under a single directory. Every artifact
//! fetched by the resolution service lands here first; later lookups of the
//! same coordinate never touch the network.

use std::path::{Path, PathBuf};

use crate::core::Coordinate;

/// On-disk cache of fetched artifacts.
#[derive(Debug, Clone)]
pub struct LocalCache {
    root: PathBuf,
}

impl LocalCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalCache { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `coordinate` is (or would be) cached.
    pub fn path_for(&self, coordinate: &Coordinate) -> PathBuf {
        self.root.join(coordinate.repository_path())
    }

    /// The cached file for `coordinate`, if present.
    pub fn get(&self, coordinate: &Coordinate) -> Option<PathBuf> {
        let path = self.path_for(coordinate);
        path.is_file().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_mirrors_repository() {
        let tmp = TempDir::new().unwrap();
        let cache = LocalCache::new(tmp.path());
        let coord = Coordinate::new("com.example", "lib", "2.0");

        assert_eq!(
            cache.path_for(&coord),
            tmp.path().join("com/example/lib/2.0/lib-2.0.jar")
        );
        assert!(cache.get(&coord).is_none());

        let path = cache.path_for(&coord);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"jar").unwrap();
        assert_eq!(cache.get(&coord), Some(path));
    }
}
