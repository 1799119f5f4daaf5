//! Closure resolution.
//!
//! The engine talks to the outside world through two narrow seams:
//!
//! - [`ResolutionService`] fetches artifacts, computes dependency lists and
//!   uploads batches. [`crate::sources::RepositorySystem`] is the real one;
//!   tests substitute an in-memory fake.
//! - [`DescriptorBuilder`] turns a fetched descriptor file into a
//!   [`Descriptor`], registering any repositories it declares with the
//!   [`ModelResolver`] it was handed.

pub mod builder;
pub mod errors;
pub mod graph;
pub mod model;
pub mod parents;

use anyhow::Result;

use crate::core::{Coordinate, Descriptor, RepositorySet, ResolvedArtifact, TargetRepository};

pub use builder::TomlDescriptorBuilder;
pub use errors::{BoxError, Phase, TransferError};
pub use graph::{collect_dependencies, DependencyGraph};
pub use model::ModelResolver;
pub use parents::ParentChain;

/// Fetches and stores artifacts.
pub trait ResolutionService {
    /// Fetch the file for `coordinate` from the first repository that has it.
    fn resolve_artifact(
        &self,
        coordinate: &Coordinate,
        repositories: &RepositorySet,
    ) -> Result<ResolvedArtifact>;

    /// Compute the transitive dependencies of `root`, excluding `root`
    /// itself. Order is unspecified.
    fn resolve_dependencies(
        &self,
        root: &ResolvedArtifact,
        repositories: &RepositorySet,
    ) -> Result<Vec<ResolvedArtifact>>;

    /// Upload every artifact to `target` as one batch.
    fn deploy(&self, artifacts: &[ResolvedArtifact], target: &TargetRepository) -> Result<()>;
}

/// Parses fetched descriptor files.
pub trait DescriptorBuilder {
    /// Parse `artifact` and register the repositories it declares with
    /// `resolver`, so they are visible when its parent is resolved.
    fn build(&self, artifact: &ResolvedArtifact, resolver: &mut ModelResolver<'_>)
        -> Result<Descriptor>;
}
