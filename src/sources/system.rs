//! The default resolution service: local cache in front of a list of
//! repositories reached through [`Transport`].

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;

use crate::core::{Coordinate, RepositorySet, ResolvedArtifact, TargetRepository};
use crate::resolver::{collect_dependencies, ResolutionService, TomlDescriptorBuilder};
use crate::sources::{LocalCache, Transport};
use crate::util::hash::{sha256_file, CHECKSUM_SUFFIX};

/// Resolves artifacts from repositories through a local cache and deploys
/// them to a target repository.
pub struct RepositorySystem {
    transport: Transport,
    cache: LocalCache,
    builder: TomlDescriptorBuilder,
    offline: bool,
    progress: ProgressBar,
}

impl RepositorySystem {
    pub fn new(transport: Transport, cache: LocalCache) -> Self {
        RepositorySystem {
            transport,
            cache,
            builder: TomlDescriptorBuilder,
            offline: false,
            progress: ProgressBar::hidden(),
        }
    }

    /// Only consult the local cache.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Report upload progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    fn deploy_one(&self, artifact: &ResolvedArtifact, target: &TargetRepository) -> Result<()> {
        let path = artifact.coordinate().repository_path();
        let checksum = sha256_file(artifact.path())?;

        self.transport
            .upload(target.repository(), &path, artifact.path())?;
        self.transport.upload_bytes(
            target.repository(),
            &format!("{}{}", path, CHECKSUM_SUFFIX),
            checksum.into_bytes(),
        )?;

        Ok(())
    }
}

impl ResolutionService for RepositorySystem {
    fn resolve_artifact(
        &self,
        coordinate: &Coordinate,
        repositories: &RepositorySet,
    ) -> Result<ResolvedArtifact> {
        if let Some(path) = self.cache.get(coordinate) {
            tracing::debug!("Using cached {}", coordinate);
            return Ok(ResolvedArtifact::new(*coordinate, path));
        }

        if self.offline {
            bail!("`{}` is not in the local cache (offline mode)", coordinate);
        }

        let dest = self.cache.path_for(coordinate);
        let path = coordinate.repository_path();

        for repository in repositories {
            tracing::debug!("Looking for {} in {}", coordinate, repository);
            if self
                .transport
                .download(repository, &path, &dest)
                .with_context(|| format!("failed to fetch `{}` from {}", coordinate, repository))?
            {
                tracing::debug!("Downloaded {} from {}", coordinate, repository.id());
                return Ok(ResolvedArtifact::new(*coordinate, dest));
            }
        }

        if repositories.is_empty() {
            bail!("`{}` cannot be resolved: no repositories configured", coordinate);
        }
        bail!(
            "`{}` was not found in any repository (tried {})",
            coordinate,
            repositories.describe()
        )
    }

    fn resolve_dependencies(
        &self,
        root: &ResolvedArtifact,
        repositories: &RepositorySet,
    ) -> Result<Vec<ResolvedArtifact>> {
        let graph = collect_dependencies(self, &self.builder, root, repositories)?;
        Ok(graph.dependencies())
    }

    fn deploy(&self, artifacts: &[ResolvedArtifact], target: &TargetRepository) -> Result<()> {
        self.progress.set_length(artifacts.len() as u64);

        let result = artifacts.iter().try_for_each(|artifact| {
            self.progress
                .set_message(artifact.coordinate().to_string());
            self.deploy_one(artifact, target).with_context(|| {
                format!("failed to upload `{}` to {}", artifact.coordinate(), target.url())
            })?;
            self.progress.inc(1);
            Ok(())
        });

        self.progress.finish_and_clear();
        result
    }
}
