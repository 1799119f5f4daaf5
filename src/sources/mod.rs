//! Artifact sources.
//!
//! Sources are responsible for fetching artifacts from repositories,
//! caching them locally, and uploading them to a target repository.

pub mod cache;
pub mod system;
pub mod transport;

pub use cache::LocalCache;
pub use system::RepositorySystem;
pub use transport::Transport;
