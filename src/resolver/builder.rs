//! Default descriptor builder for TOML descriptors.

use anyhow::{Context, Result};

use crate::core::{Descriptor, ResolvedArtifact};
use crate::resolver::{DescriptorBuilder, ModelResolver};

/// Reads descriptor files in the TOML format described in
/// [`crate::core::descriptor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDescriptorBuilder;

impl DescriptorBuilder for TomlDescriptorBuilder {
    fn build(
        &self,
        artifact: &ResolvedArtifact,
        resolver: &mut ModelResolver<'_>,
    ) -> Result<Descriptor> {
        let path = artifact.path();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read descriptor: {}", path.display()))?;

        let descriptor = Descriptor::parse(&contents, path)?;
        descriptor.check_identity(artifact.coordinate(), path)?;

        for declared in &descriptor.repositories {
            resolver.add_repository(declared);
        }

        Ok(descriptor)
    }
}
