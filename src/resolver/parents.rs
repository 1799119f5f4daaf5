//! Parent chain walking.
//!
//! A descriptor's ancestry is only known one step at a time: the parent of
//! a descriptor is discovered by parsing it, the grandparent by parsing the
//! parent, and so on. [`ParentChain`] is a lazy iterator over that ancestry.

use std::collections::HashSet;
use std::iter::FusedIterator;

use crate::core::{Coordinate, Descriptor, ParentReference, RepositorySet, ResolvedArtifact};
use crate::resolver::{DescriptorBuilder, ModelResolver, TransferError};

/// Lazily yields the descriptor artifact of every ancestor of a descriptor,
/// nearest first.
///
/// The walk stops at the first descriptor without a parent, or at the first
/// error. A parent reference that points back into the chain is reported as
/// [`TransferError::CyclicParentChain`] instead of being followed.
pub struct ParentChain<'r, 'b> {
    resolver: ModelResolver<'r>,
    builder: &'b dyn DescriptorBuilder,
    child: Coordinate,
    current: Option<Descriptor>,
    visited: HashSet<Coordinate>,
    chain: Vec<Coordinate>,
    finished: bool,
}

impl<'r, 'b> ParentChain<'r, 'b> {
    /// Start walking from `descriptor`, the already parsed descriptor whose
    /// coordinate is `start`.
    pub fn new(
        start: Coordinate,
        descriptor: Descriptor,
        resolver: ModelResolver<'r>,
        builder: &'b dyn DescriptorBuilder,
    ) -> Self {
        ParentChain {
            resolver,
            builder,
            child: start,
            current: Some(descriptor),
            visited: HashSet::from([start]),
            chain: vec![start],
            finished: false,
        }
    }

    /// Repositories visible at this point of the walk.
    pub fn repositories(&self) -> &RepositorySet {
        self.resolver.repositories()
    }

    fn step(&mut self, parent: ParentReference) -> Result<ResolvedArtifact, TransferError> {
        let child = self.child;

        let coordinate =
            parent
                .descriptor_coordinate()
                .map_err(|e| TransferError::ParentResolutionFailed {
                    coordinate: Coordinate::new(
                        parent.group.as_str(),
                        parent.name.as_str(),
                        parent.version.as_str(),
                    )
                    .descriptor(),
                    child,
                    source: Box::new(e),
                })?;

        self.chain.push(coordinate);
        if !self.visited.insert(coordinate) {
            return Err(TransferError::CyclicParentChain {
                chain: self.chain.clone(),
            });
        }

        let artifact = self
            .resolver
            .resolve_model(&parent.group, &parent.name, &parent.version)
            .map_err(|e| TransferError::ParentResolutionFailed {
                coordinate,
                child,
                source: Box::new(e),
            })?;

        let descriptor = self
            .builder
            .build(&artifact, &mut self.resolver)
            .map_err(|e| TransferError::ParentResolutionFailed {
                coordinate,
                child,
                source: e.into(),
            })?;

        tracing::debug!("Resolved parent {} of {}", coordinate, child);

        self.child = coordinate;
        self.current = Some(descriptor);
        Ok(artifact)
    }
}

impl Iterator for ParentChain<'_, '_> {
    type Item = Result<ResolvedArtifact, TransferError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(parent) = self.current.take().and_then(|d| d.parent) else {
            self.finished = true;
            return None;
        };

        let result = self.step(parent);
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

impl FusedIterator for ParentChain<'_, '_> {}
