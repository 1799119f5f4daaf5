//! Resolved artifacts and the deployment set they are staged in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::Coordinate;

/// A coordinate together with the local file the resolution service fetched
/// for it. The file is never modified by ferry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    coordinate: Coordinate,
    path: PathBuf,
}

impl ResolvedArtifact {
    pub fn new(coordinate: Coordinate, path: impl Into<PathBuf>) -> Self {
        ResolvedArtifact {
            coordinate,
            path: path.into(),
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Artifacts staged for one upload batch, deduplicated by coordinate.
///
/// Iteration follows first-insertion order so that uploads and reports are
/// stable across runs.
#[derive(Debug, Clone, Default)]
pub struct DeploymentSet {
    artifacts: Vec<ResolvedArtifact>,
    index: HashMap<Coordinate, usize>,
}

impl DeploymentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an artifact. Returns `false` (and keeps the existing entry) if
    /// its coordinate is already staged.
    pub fn insert(&mut self, artifact: ResolvedArtifact) -> bool {
        if self.index.contains_key(&artifact.coordinate) {
            return false;
        }
        self.index.insert(artifact.coordinate, self.artifacts.len());
        self.artifacts.push(artifact);
        true
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.index.contains_key(coordinate)
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&ResolvedArtifact> {
        self.index.get(coordinate).map(|&i| &self.artifacts[i])
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedArtifact> {
        self.artifacts.iter()
    }

    pub fn as_slice(&self) -> &[ResolvedArtifact] {
        &self.artifacts
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.artifacts.iter().map(|a| a.coordinate).collect()
    }
}

impl<'a> IntoIterator for &'a DeploymentSet {
    type Item = &'a ResolvedArtifact;
    type IntoIter = std::slice::Iter<'a, ResolvedArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}
