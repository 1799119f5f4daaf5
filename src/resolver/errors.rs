//! Transfer error types and diagnostics.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;
use url::Url;

use crate::core::Coordinate;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Boxed cause carried by every [`TransferError`] variant.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which half of a transfer an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolution,
    Transfer,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Resolution => write!(f, "resolution"),
            Phase::Transfer => write!(f, "transfer"),
        }
    }
}

/// Error aborting a transfer. Every variant is terminal.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum TransferError {
    #[error("failed to resolve root artifact `{coordinate}`")]
    #[diagnostic(code(ferry::resolve::root))]
    RootResolutionFailed {
        coordinate: Coordinate,
        #[source]
        source: BoxError,
    },

    #[error("could not resolve dependencies of `{root}`")]
    #[diagnostic(code(ferry::resolve::dependencies))]
    DependencyGraphFailed {
        root: Coordinate,
        #[source]
        source: BoxError,
    },

    #[error("failed to resolve descriptor of dependency `{dependency}`")]
    #[diagnostic(code(ferry::resolve::descriptor))]
    DescriptorResolutionFailed {
        dependency: Coordinate,
        #[source]
        source: BoxError,
    },

    #[error("descriptor `{coordinate}` is not available from {repositories}")]
    #[diagnostic(code(ferry::resolve::model))]
    UnresolvableModel {
        coordinate: Coordinate,
        repositories: String,
        #[source]
        source: BoxError,
    },

    #[error("could not resolve parent `{coordinate}` of `{child}`")]
    #[diagnostic(code(ferry::resolve::parent))]
    ParentResolutionFailed {
        coordinate: Coordinate,
        child: Coordinate,
        #[source]
        source: BoxError,
    },

    #[error("cyclic parent chain: {}", format_chain(.chain))]
    #[diagnostic(
        code(ferry::resolve::cyclic_parent),
        help("A descriptor lists one of its own descendants as parent; fix the [parent] section")
    )]
    CyclicParentChain { chain: Vec<Coordinate> },

    #[error("failed to deploy {} artifacts to {target}", .artifacts.len())]
    #[diagnostic(code(ferry::deploy))]
    DeploymentFailed {
        target: Url,
        artifacts: Vec<Coordinate>,
        #[source]
        source: BoxError,
    },
}

fn format_chain(chain: &[Coordinate]) -> String {
    chain
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl TransferError {
    pub fn phase(&self) -> Phase {
        match self {
            TransferError::DeploymentFailed { .. } => Phase::Transfer,
            _ => Phase::Resolution,
        }
    }

    /// The coordinate the failure is about, if there is a single one.
    pub fn coordinate(&self) -> Option<&Coordinate> {
        match self {
            TransferError::RootResolutionFailed { coordinate, .. }
            | TransferError::UnresolvableModel { coordinate, .. }
            | TransferError::ParentResolutionFailed { coordinate, .. } => Some(coordinate),
            TransferError::DependencyGraphFailed { root, .. } => Some(root),
            TransferError::DescriptorResolutionFailed { dependency, .. } => Some(dependency),
            TransferError::CyclicParentChain { chain } => chain.last(),
            TransferError::DeploymentFailed { .. } => None,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string())
            .with_context(format!("phase: {}", self.phase()));

        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            diag = diag.with_context(format!("caused by: {}", err));
            cause = err.source();
        }

        match self {
            TransferError::RootResolutionFailed { .. }
            | TransferError::DescriptorResolutionFailed { .. }
            | TransferError::UnresolvableModel { .. } => diag
                .with_suggestion(suggestions::CHECK_COORDINATE)
                .with_suggestion(suggestions::ADD_REPOSITORY),

            TransferError::DependencyGraphFailed { .. } => diag
                .with_suggestion(suggestions::ADD_REPOSITORY)
                .with_suggestion(suggestions::VERBOSE),

            TransferError::ParentResolutionFailed { .. } => {
                diag.with_suggestion(suggestions::ADD_REPOSITORY)
            }

            TransferError::CyclicParentChain { .. } => {
                diag.with_suggestion(suggestions::FIX_PARENT)
            }

            TransferError::DeploymentFailed { artifacts, .. } => {
                for coordinate in artifacts {
                    diag = diag.with_context(format!("in batch: {}", coordinate));
                }
                diag.with_suggestion(suggestions::CHECK_TARGET)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    #[test]
    fn test_root_failure_diagnostic_keeps_cause() {
        let err = TransferError::RootResolutionFailed {
            coordinate: coord("com.example:app:1.0"),
            source: "not found in central, internal".into(),
        };

        assert_eq!(err.phase(), Phase::Resolution);
        assert_eq!(err.coordinate(), Some(&coord("com.example:app:1.0")));

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("failed to resolve root artifact `com.example:app:1.0`"));
        assert!(output.contains("phase: resolution"));
        assert!(output.contains("caused by: not found in central, internal"));
    }

    #[test]
    fn test_nested_parent_failure_reports_whole_chain() {
        let inner = TransferError::UnresolvableModel {
            coordinate: coord("com.example:lib-parent:toml:1.0"),
            repositories: "central".to_string(),
            source: "404".into(),
        };
        let err = TransferError::ParentResolutionFailed {
            coordinate: coord("com.example:lib-parent:toml:1.0"),
            child: coord("com.example:lib:toml:2.0"),
            source: Box::new(inner),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("could not resolve parent"));
        assert!(output.contains("is not available from central"));
        assert!(output.contains("caused by: 404"));
    }

    #[test]
    fn test_cycle_message() {
        let err = TransferError::CyclicParentChain {
            chain: vec![
                coord("com.example:a:toml:1"),
                coord("com.example:b:toml:1"),
                coord("com.example:a:toml:1"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "cyclic parent chain: com.example:a:toml:1 -> com.example:b:toml:1 -> com.example:a:toml:1"
        );
    }

    #[test]
    fn test_deployment_failure_lists_batch() {
        let err = TransferError::DeploymentFailed {
            target: Url::parse("https://repo.example.com/releases/").unwrap(),
            artifacts: vec![coord("com.example:app:1.0"), coord("com.example:lib:2.0")],
            source: "401 Unauthorized".into(),
        };

        assert_eq!(err.phase(), Phase::Transfer);
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("failed to deploy 2 artifacts"));
        assert!(output.contains("in batch: com.example:lib:2.0"));
        assert!(output.contains("phase: transfer"));
    }
}
