//! Test fixtures for descriptors and on-disk repositories.

use std::path::{Path, PathBuf};

use url::Url;

use crate::core::{
    Coordinate, DeclaredDependency, DeclaredRepository, Descriptor, ParentReference,
};

/// Builder for [`Descriptor`] values.
#[derive(Debug, Clone, Default)]
pub struct DescriptorFixture {
    descriptor: Descriptor,
}

/// Start building a descriptor.
pub fn descriptor() -> DescriptorFixture {
    DescriptorFixture::default()
}

fn split(gnv: &str) -> (String, String, String) {
    let parts: Vec<&str> = gnv.split(':').collect();
    match parts.as_slice() {
        [g, n, v] => (g.to_string(), n.to_string(), v.to_string()),
        _ => panic!("expected group:name:version, got {gnv}"),
    }
}

impl DescriptorFixture {
    /// Set the parent, given as `group:name:version`.
    pub fn parent(mut self, gnv: &str) -> Self {
        let (group, name, version) = split(gnv);
        self.descriptor.parent = Some(ParentReference {
            group,
            name,
            version,
        });
        self
    }

    pub fn repository(mut self, id: &str, url: &str) -> Self {
        self.descriptor.repositories.push(DeclaredRepository {
            id: id.to_string(),
            url: Url::parse(url).expect("valid url"),
        });
        self
    }

    pub fn dependency(self, gnv: &str) -> Self {
        self.push_dependency(gnv, false)
    }

    pub fn optional_dependency(self, gnv: &str) -> Self {
        self.push_dependency(gnv, true)
    }

    fn push_dependency(mut self, gnv: &str, optional: bool) -> Self {
        let (group, name, version) = split(gnv);
        self.descriptor.dependencies.push(DeclaredDependency {
            group,
            name,
            version,
            classifier: None,
            extension: None,
            optional,
        });
        self
    }

    pub fn build(self) -> Descriptor {
        self.descriptor
    }
}

/// Write `contents` at the repository-layout path of `coordinate` under
/// `root`, creating directories as needed.
pub fn write_repository_file(root: &Path, coordinate: &Coordinate, contents: &str) -> PathBuf {
    let path = root.join(coordinate.repository_path());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create repository dirs");
    }
    std::fs::write(&path, contents).expect("failed to write repository file");
    path
}
