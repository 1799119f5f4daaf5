//! Test utilities for ferry unit tests.
//!
//! [`FakeResolutionService`] stands in for a set of remote repositories:
//! artifacts are real files under a temporary directory, and every call the
//! engine makes is recorded so tests can assert on lookups and uploads.
//!
//! # Example
//!
//! ```rust,ignore
//! use ferry::test_support::{descriptor, FakeResolutionService};
//!
//! let service = FakeResolutionService::new();
//! service.add_artifact(&"com.example:lib:2.0".parse().unwrap());
//! service.add_descriptor(
//!     &"com.example:lib:2.0".parse().unwrap(),
//!     &descriptor().parent("com.example:lib-parent:1.0").build(),
//! );
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Result};
use tempfile::TempDir;

use crate::core::{Coordinate, Descriptor, RepositorySet, ResolvedArtifact, TargetRepository};
use crate::resolver::ResolutionService;

// Re-export fixtures for convenience
pub use fixtures::*;

#[derive(Debug, Default)]
struct FakeState {
    /// Stored files, optionally restricted to one repository id.
    artifacts: HashMap<Coordinate, (PathBuf, Option<String>)>,
    dependencies: HashMap<Coordinate, Result<Vec<Coordinate>, String>>,
    deploy_failure: Option<String>,
    resolve_counts: HashMap<Coordinate, usize>,
    uploads: Vec<Vec<Coordinate>>,
}

/// In-memory resolution service backed by a temporary directory.
pub struct FakeResolutionService {
    dir: TempDir,
    state: Mutex<FakeState>,
}

impl FakeResolutionService {
    pub fn new() -> Self {
        FakeResolutionService {
            dir: TempDir::new().expect("failed to create temp dir"),
            state: Mutex::new(FakeState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn store(&self, coordinate: &Coordinate, contents: &str, repository: Option<&str>) -> ResolvedArtifact {
        let path = write_repository_file(self.dir.path(), coordinate, contents);
        self.state().artifacts.insert(
            *coordinate,
            (path.clone(), repository.map(str::to_string)),
        );
        ResolvedArtifact::new(*coordinate, path)
    }

    /// Make `coordinate` resolvable from any repository set.
    pub fn add_artifact(&self, coordinate: &Coordinate) -> ResolvedArtifact {
        self.store(coordinate, &coordinate.file_name(), None)
    }

    /// Make `coordinate` resolvable only when `repository` is visible.
    pub fn add_artifact_in(&self, coordinate: &Coordinate, repository: &str) -> ResolvedArtifact {
        self.store(coordinate, &coordinate.file_name(), Some(repository))
    }

    /// Publish `descriptor` as the descriptor of `primary`.
    pub fn add_descriptor(&self, primary: &Coordinate, descriptor: &Descriptor) -> ResolvedArtifact {
        let contents = toml::to_string(descriptor).expect("descriptor serializes");
        self.store(&primary.descriptor(), &contents, None)
    }

    /// Store raw file contents for `coordinate`.
    pub fn add_raw(&self, coordinate: &Coordinate, contents: &str) -> ResolvedArtifact {
        self.store(coordinate, contents, None)
    }

    pub fn add_raw_in(
        &self,
        coordinate: &Coordinate,
        contents: &str,
        repository: &str,
    ) -> ResolvedArtifact {
        self.store(coordinate, contents, Some(repository))
    }

    /// A stored artifact, bypassing repository visibility.
    pub fn resolve_file(&self, coordinate: &Coordinate) -> ResolvedArtifact {
        let state = self.state();
        let (path, _) = state
            .artifacts
            .get(coordinate)
            .unwrap_or_else(|| panic!("{} was never added", coordinate));
        ResolvedArtifact::new(*coordinate, path.clone())
    }

    /// A stored descriptor file, bypassing repository visibility.
    pub fn resolve_descriptor_file(&self, descriptor: &Coordinate) -> ResolvedArtifact {
        assert!(descriptor.is_descriptor(), "{} is not a descriptor", descriptor);
        self.resolve_file(descriptor)
    }

    /// Dependencies returned for `root`.
    pub fn set_dependencies(&self, root: &Coordinate, dependencies: &[&str]) {
        let dependencies = dependencies
            .iter()
            .map(|d| d.parse().expect("valid coordinate"))
            .collect();
        self.state().dependencies.insert(*root, Ok(dependencies));
    }

    /// Make dependency resolution of `root` fail with `message`.
    pub fn fail_dependencies(&self, root: &Coordinate, message: &str) {
        self.state()
            .dependencies
            .insert(*root, Err(message.to_string()));
    }

    /// Make every deploy fail with `message`.
    pub fn fail_deploy(&self, message: &str) {
        self.state().deploy_failure = Some(message.to_string());
    }

    /// How many times `coordinate` was looked up.
    pub fn resolve_count(&self, coordinate: &Coordinate) -> usize {
        self.state()
            .resolve_counts
            .get(coordinate)
            .copied()
            .unwrap_or(0)
    }

    /// Every successful upload batch, in order.
    pub fn uploads(&self) -> Vec<Vec<Coordinate>> {
        self.state().uploads.clone()
    }
}

impl Default for FakeResolutionService {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionService for FakeResolutionService {
    fn resolve_artifact(
        &self,
        coordinate: &Coordinate,
        repositories: &RepositorySet,
    ) -> Result<ResolvedArtifact> {
        let mut state = self.state();
        *state.resolve_counts.entry(*coordinate).or_default() += 1;

        match state.artifacts.get(coordinate) {
            Some((path, None)) => Ok(ResolvedArtifact::new(*coordinate, path.clone())),
            Some((path, Some(id))) if repositories.contains(id) => {
                Ok(ResolvedArtifact::new(*coordinate, path.clone()))
            }
            _ => bail!(
                "`{}` was not found in any repository (tried {})",
                coordinate,
                repositories.describe()
            ),
        }
    }

    fn resolve_dependencies(
        &self,
        root: &ResolvedArtifact,
        repositories: &RepositorySet,
    ) -> Result<Vec<ResolvedArtifact>> {
        let configured = self.state().dependencies.get(root.coordinate()).cloned();
        match configured {
            None => Ok(Vec::new()),
            Some(Err(message)) => bail!("{}", message),
            Some(Ok(dependencies)) => dependencies
                .iter()
                .map(|d| self.resolve_artifact(d, repositories))
                .collect(),
        }
    }

    fn deploy(&self, artifacts: &[ResolvedArtifact], _target: &TargetRepository) -> Result<()> {
        let mut state = self.state();
        if let Some(message) = &state.deploy_failure {
            bail!("{}", message);
        }
        state
            .uploads
            .push(artifacts.iter().map(|a| *a.coordinate()).collect());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_artifact_needs_repository() {
        let service = FakeResolutionService::new();
        let coord: Coordinate = "com.example:lib:2.0".parse().unwrap();
        service.add_artifact_in(&coord, "internal");

        assert!(service.resolve_artifact(&coord, &RepositorySet::new()).is_err());
        assert_eq!(service.resolve_count(&coord), 1);
        assert_eq!(
            std::fs::read_to_string(service.resolve_file(&coord).path()).unwrap(),
            "lib-2.0.jar"
        );
    }
}
