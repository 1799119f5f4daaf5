//! Core data structures for ferry.
//!
//! - Coordinates (artifact identity)
//! - Repository references and the monotonic repository set
//! - Descriptors
//! - Resolved artifacts and the deployment set

pub mod artifact;
pub mod coordinate;
pub mod descriptor;
pub mod repository;

pub use artifact::{DeploymentSet, ResolvedArtifact};
pub use coordinate::{Coordinate, CoordinateError, DEFAULT_EXTENSION, DESCRIPTOR_EXTENSION};
pub use descriptor::{
    DeclaredDependency, DeclaredRepository, Descriptor, DescriptorMismatchError,
    DescriptorParseError, ParentReference,
};
pub use repository::{Credential, RepositoryRef, RepositorySet, TargetRepository};
