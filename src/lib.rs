//! ferry - transfer an artifact and its full dependency closure between
//! package repositories.
//!
//! Given a root coordinate, ferry resolves the root artifact, its transitive
//! dependencies, each dependency's descriptor and every ancestor of those
//! descriptors, then uploads the deduplicated set to a target repository in
//! a single batch.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities for ferry unit tests.
///
/// Only available when compiling tests. Provides an in-memory resolution
/// service and descriptor fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{Coordinate, DeploymentSet, RepositorySet, ResolvedArtifact, TargetRepository};
pub use ops::{transfer, TransferOptions, TransferReport};
pub use resolver::{ResolutionService, TransferError};
pub use util::context::GlobalContext;
