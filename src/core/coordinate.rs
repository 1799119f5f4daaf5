//! Artifact coordinates - WHICH file in a repository.
//!
//! A Coordinate is the identity key of everything ferry moves around: the
//! deployment set deduplicates on it, the repository layout derives paths
//! from it, and errors report it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::InternedString;

/// Extension used when a coordinate does not name one.
pub const DEFAULT_EXTENSION: &str = "jar";

/// Extension of descriptor files.
pub const DESCRIPTOR_EXTENSION: &str = "toml";

/// Error produced when a coordinate string or component is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("invalid coordinate `{0}`: expected `group:name[:extension[:classifier]]:version`")]
    Malformed(String),

    #[error("invalid coordinate `{input}`: {field} must not be empty")]
    Empty { input: String, field: &'static str },

    #[error("invalid coordinate `{input}`: {field} `{value}` contains `{found}`")]
    IllegalCharacter {
        input: String,
        field: &'static str,
        value: String,
        found: char,
    },

    #[error("invalid coordinate `{input}`: group `{group}` has an empty segment")]
    EmptyGroupSegment { input: String, group: String },
}

/// Identifies one artifact file: `(group, name, version, classifier, extension)`.
///
/// Coordinates are `Copy`; all components are interned. An explicit
/// `jar` extension is stored as absent so that `g:n:v` and `g:n:jar:v`
/// are the same identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    group: InternedString,
    name: InternedString,
    version: InternedString,
    classifier: Option<InternedString>,
    extension: Option<InternedString>,
}

impl Coordinate {
    /// Create a coordinate for the primary artifact of `group:name:version`.
    pub fn new(
        group: impl Into<InternedString>,
        name: impl Into<InternedString>,
        version: impl Into<InternedString>,
    ) -> Self {
        Coordinate {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            classifier: None,
            extension: None,
        }
    }

    /// Like [`Coordinate::new`] but rejects components that cannot be mapped
    /// onto a repository path.
    pub fn try_new(group: &str, name: &str, version: &str) -> Result<Self, CoordinateError> {
        let input = format!("{}:{}:{}", group, name, version);
        check_group(&input, group)?;
        check_component(&input, "name", name)?;
        check_component(&input, "version", version)?;
        Ok(Self::new(group, name, version))
    }

    /// Set the classifier. An empty classifier clears it.
    pub fn with_classifier(mut self, classifier: Option<&str>) -> Self {
        self.classifier = classifier
            .filter(|c| !c.is_empty())
            .map(InternedString::new);
        self
    }

    /// Set the extension. Empty or `jar` clears it.
    pub fn with_extension(mut self, extension: Option<&str>) -> Self {
        self.extension = extension
            .filter(|e| !e.is_empty() && *e != DEFAULT_EXTENSION)
            .map(InternedString::new);
        self
    }

    /// Like [`Coordinate::with_classifier`] but rejects a classifier that
    /// cannot be part of a file name.
    pub fn try_with_classifier(self, classifier: Option<&str>) -> Result<Self, CoordinateError> {
        if let Some(value) = classifier.filter(|c| !c.is_empty()) {
            check_component(&self.to_string(), "classifier", value)?;
        }
        Ok(self.with_classifier(classifier))
    }

    /// Like [`Coordinate::with_extension`] but rejects an extension that
    /// cannot be part of a file name.
    pub fn try_with_extension(self, extension: Option<&str>) -> Result<Self, CoordinateError> {
        if let Some(value) = extension.filter(|e| !e.is_empty()) {
            check_component(&self.to_string(), "extension", value)?;
        }
        Ok(self.with_extension(extension))
    }

    pub fn group(&self) -> &str {
        self.group.as_str()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.map(|c| c.as_str())
    }

    /// The effective extension (`jar` when none was given).
    pub fn extension(&self) -> &str {
        self.extension
            .map(|e| e.as_str())
            .unwrap_or(DEFAULT_EXTENSION)
    }

    /// The coordinate of this artifact's descriptor file.
    pub fn descriptor(&self) -> Coordinate {
        Coordinate {
            group: self.group,
            name: self.name,
            version: self.version,
            classifier: None,
            extension: Some(InternedString::new(DESCRIPTOR_EXTENSION)),
        }
    }

    /// Check whether this coordinate names a descriptor file.
    pub fn is_descriptor(&self) -> bool {
        self.classifier.is_none() && self.extension() == DESCRIPTOR_EXTENSION
    }

    /// File name in the repository layout, e.g. `lib-2.0-linux.jar`.
    pub fn file_name(&self) -> String {
        match self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.name,
                self.version,
                classifier,
                self.extension()
            ),
            None => format!("{}-{}.{}", self.name, self.version, self.extension()),
        }
    }

    /// Path relative to a repository root:
    /// `com/example/lib/2.0/lib-2.0.jar`.
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.name,
            self.version,
            self.file_name()
        )
    }
}

fn check_component(input: &str, field: &'static str, value: &str) -> Result<(), CoordinateError> {
    if value.trim().is_empty() {
        return Err(CoordinateError::Empty {
            input: input.to_string(),
            field,
        });
    }

    if let Some(found) = value
        .chars()
        .find(|c| matches!(c, '/' | '\\' | ':') || c.is_whitespace())
    {
        return Err(CoordinateError::IllegalCharacter {
            input: input.to_string(),
            field,
            value: value.to_string(),
            found,
        });
    }

    if value == "." || value == ".." {
        return Err(CoordinateError::IllegalCharacter {
            input: input.to_string(),
            field,
            value: value.to_string(),
            found: '.',
        });
    }

    Ok(())
}

/// Every dot-separated group segment becomes a directory, so none may be empty.
fn check_group(input: &str, group: &str) -> Result<(), CoordinateError> {
    check_component(input, "group", group)?;
    if group.split('.').any(str::is_empty) {
        return Err(CoordinateError::EmptyGroupSegment {
            input: input.to_string(),
            group: group.to_string(),
        });
    }
    Ok(())
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    /// Parse `group:name:version`, `group:name:extension:version` or
    /// `group:name:extension:classifier:version`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();

        let (group, name, extension, classifier, version) = match parts.as_slice() {
            [g, n, v] => (*g, *n, None, None, *v),
            [g, n, e, v] => (*g, *n, Some(*e), None, *v),
            [g, n, e, c, v] => (*g, *n, Some(*e), Some(*c), *v),
            _ => return Err(CoordinateError::Malformed(s.to_string())),
        };

        check_group(s, group)?;
        check_component(s, "name", name)?;
        check_component(s, "version", version)?;
        if let Some(extension) = extension {
            check_component(s, "extension", extension)?;
        }
        if let Some(classifier) = classifier.filter(|c| !c.is_empty()) {
            check_component(s, "classifier", classifier)?;
        }

        Ok(Coordinate::new(group, name, version)
            .with_extension(extension)
            .with_classifier(classifier))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)?;
        match (self.extension, self.classifier) {
            (_, Some(classifier)) => write!(f, ":{}:{}", self.extension(), classifier)?,
            (Some(extension), None) => write!(f, ":{}", extension)?,
            (None, None) => {}
        }
        write!(f, ":{}", self.version)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({})", self)
    }
}

impl Serialize for Coordinate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
