//! Model resolver - lets descriptor parsing reach back into the
//! resolution service.
//!
//! Repositories are discovered while descriptors are parsed: a descriptor
//! may declare the repository its own parent lives in. Each resolver owns
//! its repository set, so additions made while walking one dependency's
//! ancestry stay out of its siblings' walks. [`ModelResolver::fork`] hands a
//! nested walk a snapshot.

use crate::core::{Coordinate, DeclaredRepository, RepositorySet, ResolvedArtifact};
use crate::resolver::{ResolutionService, TransferError};

/// Resolves descriptors against a growing, per-walk repository set.
pub struct ModelResolver<'a> {
    service: &'a dyn ResolutionService,
    repositories: RepositorySet,
}

impl<'a> ModelResolver<'a> {
    pub fn new(service: &'a dyn ResolutionService, repositories: RepositorySet) -> Self {
        ModelResolver {
            service,
            repositories,
        }
    }

    /// Resolve the descriptor of `group:name:version` against the current
    /// repository set.
    pub fn resolve_model(
        &self,
        group: &str,
        name: &str,
        version: &str,
    ) -> Result<ResolvedArtifact, TransferError> {
        let coordinate = match Coordinate::try_new(group, name, version) {
            Ok(c) => c.descriptor(),
            Err(e) => {
                return Err(TransferError::UnresolvableModel {
                    coordinate: Coordinate::new(group, name, version).descriptor(),
                    repositories: self.repositories.describe(),
                    source: Box::new(e),
                })
            }
        };

        self.service
            .resolve_artifact(&coordinate, &self.repositories)
            .map_err(|e| TransferError::UnresolvableModel {
                coordinate,
                repositories: self.repositories.describe(),
                source: e.into(),
            })
    }

    /// Make a declared repository visible to later lookups. Returns `false`
    /// when a repository with the same id is already known; the known entry
    /// is kept.
    pub fn add_repository(&mut self, declared: &DeclaredRepository) -> bool {
        let added = self.repositories.insert(declared.to_repository());
        if added {
            tracing::debug!("Added repository {} ({})", declared.id, declared.url);
        }
        added
    }

    /// An independent resolver sharing the same service, starting from a
    /// snapshot of this one's repositories.
    pub fn fork(&self) -> ModelResolver<'a> {
        ModelResolver {
            service: self.service,
            repositories: self.repositories.clone(),
        }
    }

    pub fn repositories(&self) -> &RepositorySet {
        &self.repositories
    }
}
