//! Deploy a resolved closure to the target repository.

use crate::core::{DeploymentSet, TargetRepository};
use crate::resolver::{ResolutionService, TransferError};

/// Upload every artifact of `deployment` to `target` in one call.
///
/// An empty set is still handed to the service.
pub fn deploy(
    service: &dyn ResolutionService,
    deployment: &DeploymentSet,
    target: &TargetRepository,
) -> Result<(), TransferError> {
    tracing::info!(
        "Deploying {} artifacts to {}",
        deployment.len(),
        target.url()
    );

    service
        .deploy(deployment.as_slice(), target)
        .map_err(|e| TransferError::DeploymentFailed {
            target: target.url().clone(),
            artifacts: deployment.coordinates(),
            source: e.into(),
        })?;

    tracing::info!("Deployed {} artifacts", deployment.len());
    Ok(())
}
