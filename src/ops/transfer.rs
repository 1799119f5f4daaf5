//! Implementation of `ferry transfer`.
//!
//! Resolves a root artifact, its transitive dependencies and every ancestor
//! descriptor of those dependencies, then uploads all of it to the target
//! repository in one batch. Nothing is uploaded unless resolution of the
//! whole closure succeeded.

use std::collections::HashSet;

use serde::Serialize;

use crate::core::{Coordinate, DeploymentSet, RepositorySet, TargetRepository};
use crate::ops::deploy::deploy;
use crate::resolver::{
    DescriptorBuilder, ModelResolver, ParentChain, ResolutionService, TransferError,
};

/// Options for the transfer operation.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Resolve the closure but do not upload it
    pub dry_run: bool,
}

/// Outcome of a successful transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    /// The coordinate actually transferred, classifier and extension included
    pub root: Coordinate,
    pub target: String,
    /// Dependencies as returned by the resolution service
    pub dependencies: Vec<Coordinate>,
    /// Distinct ancestor descriptors found while walking parent chains
    pub ancestors: Vec<Coordinate>,
    /// Everything in the upload batch, in upload order
    pub artifacts: Vec<Coordinate>,
    pub deployed: bool,
}

/// Transfer `root` and its closure from `sources` to `target`.
pub fn transfer(
    service: &dyn ResolutionService,
    builder: &dyn DescriptorBuilder,
    root: &Coordinate,
    sources: &RepositorySet,
    target: &TargetRepository,
    opts: &TransferOptions,
) -> Result<TransferReport, TransferError> {
    let mut deployment = DeploymentSet::new();

    tracing::info!("Resolving {}", root);
    let root_artifact = service
        .resolve_artifact(root, sources)
        .map_err(|e| TransferError::RootResolutionFailed {
            coordinate: *root,
            source: e.into(),
        })?;
    deployment.insert(root_artifact.clone());

    let dependencies = service
        .resolve_dependencies(&root_artifact, sources)
        .map_err(|e| TransferError::DependencyGraphFailed {
            root: *root,
            source: e.into(),
        })?;
    tracing::info!("Resolved {} dependencies of {}", dependencies.len(), root);

    let mut ancestors = Vec::new();
    let mut seen_ancestors = HashSet::new();

    for dependency in &dependencies {
        let coordinate = *dependency.coordinate();
        deployment.insert(dependency.clone());

        let descriptor_artifact = service
            .resolve_artifact(&coordinate.descriptor(), sources)
            .map_err(|e| TransferError::DescriptorResolutionFailed {
                dependency: coordinate,
                source: e.into(),
            })?;
        tracing::debug!("Resolved descriptor of {}", coordinate);
        deployment.insert(descriptor_artifact.clone());

        let mut resolver = ModelResolver::new(service, sources.clone());
        let descriptor = builder
            .build(&descriptor_artifact, &mut resolver)
            .map_err(|e| TransferError::DescriptorResolutionFailed {
                dependency: coordinate,
                source: e.into(),
            })?;

        let chain = ParentChain::new(
            *descriptor_artifact.coordinate(),
            descriptor,
            resolver,
            builder,
        );
        for ancestor in chain {
            let ancestor = ancestor?;
            if seen_ancestors.insert(*ancestor.coordinate()) {
                ancestors.push(*ancestor.coordinate());
            }
            deployment.insert(ancestor);
        }
    }

    let report = TransferReport {
        root: *root,
        target: target.url().to_string(),
        dependencies: dependencies.iter().map(|d| *d.coordinate()).collect(),
        ancestors,
        artifacts: deployment.coordinates(),
        deployed: !opts.dry_run,
    };

    if opts.dry_run {
        tracing::info!(
            "Dry run: {} artifacts would be deployed to {}",
            deployment.len(),
            target.url()
        );
        return Ok(report);
    }

    deploy(service, &deployment, target)?;

    Ok(report)
}
