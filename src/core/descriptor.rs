//! Descriptors - the metadata file published next to every artifact.
//!
//! A descriptor names its parent (if any), the repositories it expects its
//! own ancestry and dependencies to come from, and its dependencies.
//!
//! ```toml
//! [artifact]
//! group = "com.example"
//! name = "lib"
//! version = "2.0"
//!
//! [parent]
//! group = "com.example"
//! name = "lib-parent"
//! version = "1.0"
//!
//! [[repositories]]
//! id = "internal"
//! url = "https://repo.example.com/releases"
//!
//! [[dependencies]]
//! group = "com.example"
//! name = "util"
//! version = "1.1"
//! ```

use std::path::Path;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::core::{Coordinate, CoordinateError, RepositoryRef};

/// Reference to a parent descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentReference {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl ParentReference {
    /// Coordinate of the parent's descriptor file.
    pub fn descriptor_coordinate(&self) -> Result<Coordinate, CoordinateError> {
        Coordinate::try_new(&self.group, &self.name, &self.version).map(|c| c.descriptor())
    }
}

/// A repository declared inside a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredRepository {
    pub id: String,
    pub url: Url,
}

impl DeclaredRepository {
    pub fn to_repository(&self) -> RepositoryRef {
        RepositoryRef::new(self.id.as_str(), self.url.clone())
    }
}

/// A dependency declared inside a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Optional dependencies are not part of a consumer's closure.
    #[serde(default)]
    pub optional: bool,
}

impl DeclaredDependency {
    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        Coordinate::try_new(&self.group, &self.name, &self.version)?
            .try_with_classifier(self.classifier.as_deref())?
            .try_with_extension(self.extension.as_deref())
    }
}

/// Self-identification block of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactBlock {
    pub group: String,
    pub name: String,
    pub version: String,
}

/// A parsed descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactBlock>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<DeclaredRepository>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DeclaredDependency>,
}

/// A descriptor that is not valid TOML or does not match the schema.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("failed to parse descriptor {path}: {message}")]
#[diagnostic(
    code(ferry::descriptor::parse),
    help("Descriptors are TOML with optional [artifact], [parent], [[repositories]] and [[dependencies]] sections")
)]
pub struct DescriptorParseError {
    pub path: String,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

/// A descriptor whose `[artifact]` block names a different artifact than
/// the one it was fetched for.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("descriptor {path} describes `{found}` but was fetched as `{expected}`")]
#[diagnostic(code(ferry::descriptor::mismatch))]
pub struct DescriptorMismatchError {
    pub path: String,
    pub expected: String,
    pub found: String,
}

impl Descriptor {
    /// Parse descriptor text. `path` is only used for error reporting.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, DescriptorParseError> {
        toml::from_str(contents).map_err(|e| DescriptorParseError {
            path: path.display().to_string(),
            message: e.message().to_string(),
            src: NamedSource::new(path.display().to_string(), contents.to_string()),
            span: e.span().map(SourceSpan::from),
        })
    }

    /// Check the `[artifact]` block (when present) against the coordinate the
    /// file was fetched for. Descriptors without the block are accepted.
    pub fn check_identity(
        &self,
        coordinate: &Coordinate,
        path: &Path,
    ) -> Result<(), DescriptorMismatchError> {
        let Some(artifact) = &self.artifact else {
            return Ok(());
        };

        if artifact.group == coordinate.group()
            && artifact.name == coordinate.name()
            && artifact.version == coordinate.version()
        {
            return Ok(());
        }

        Err(DescriptorMismatchError {
            path: path.display().to_string(),
            expected: format!(
                "{}:{}:{}",
                coordinate.group(),
                coordinate.name(),
                coordinate.version()
            ),
            found: format!("{}:{}:{}", artifact.group, artifact.name, artifact.version),
        })
    }

    pub fn parent(&self) -> Option<&ParentReference> {
        self.parent.as_ref()
    }

    /// Non-optional declared dependencies.
    pub fn required_dependencies(&self) -> impl Iterator<Item = &DeclaredDependency> {
        self.dependencies.iter().filter(|d| !d.optional)
    }
}
