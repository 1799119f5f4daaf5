//! Repository references - WHERE artifacts are read from and written to.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use url::Url;

use crate::util::InternedString;

/// Username and password attached to a repository.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: Option<String>,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Credential {
            username: username.into(),
            password,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A named repository location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    id: InternedString,
    url: Url,
    credential: Option<Credential>,
}

impl RepositoryRef {
    /// Create a repository reference. A trailing slash is added to the URL
    /// path so that layout paths join below it instead of replacing the last
    /// segment.
    pub fn new(id: impl Into<InternedString>, mut url: Url) -> Self {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        RepositoryRef {
            id: id.into(),
            url,
            credential: None,
        }
    }

    /// Parse an `id=url` pair as given on the command line. A bare URL gets
    /// an id derived from its host.
    pub fn parse_spec(spec: &str) -> Result<Self> {
        let (id, url) = match spec.split_once('=') {
            Some((id, url)) if !id.is_empty() && !id.contains(':') => (Some(id), url),
            _ => (None, spec),
        };

        let url = Url::parse(url).with_context(|| format!("invalid repository URL `{}`", url))?;
        let id = match id {
            Some(id) => id.to_string(),
            None => url
                .host_str()
                .map(|h| h.to_string())
                .unwrap_or_else(|| "local".to_string()),
        };

        Ok(Self::new(id, url))
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Resolve a layout path (`com/example/...`) against this repository.
    pub fn join(&self, path: &str) -> Result<Url> {
        self.url
            .join(path)
            .with_context(|| format!("cannot join `{}` onto {}", path, self.url))
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// Ordered set of repositories, unique by id.
///
/// The set only grows: inserting an id that is already present keeps the
/// first entry untouched. Cloning takes an independent snapshot.
#[derive(Debug, Clone, Default)]
pub struct RepositorySet {
    repositories: Vec<RepositoryRef>,
    ids: HashSet<InternedString>,
}

impl RepositorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a repository. Returns `false` if its id was already known.
    pub fn insert(&mut self, repository: RepositoryRef) -> bool {
        if !self.ids.insert(repository.id) {
            return false;
        }
        self.repositories.push(repository);
        true
    }

    pub fn get(&self, id: &str) -> Option<&RepositoryRef> {
        self.repositories.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepositoryRef> {
        self.repositories.iter()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Comma separated ids, for error messages.
    pub fn describe(&self) -> String {
        self.repositories
            .iter()
            .map(|r| r.id())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<RepositoryRef> for RepositorySet {
    fn from_iter<I: IntoIterator<Item = RepositoryRef>>(iter: I) -> Self {
        let mut set = RepositorySet::new();
        for repository in iter {
            set.insert(repository);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RepositorySet {
    type Item = &'a RepositoryRef;
    type IntoIter = std::slice::Iter<'a, RepositoryRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.repositories.iter()
    }
}

/// The single write destination of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRepository {
    repository: RepositoryRef,
}

impl TargetRepository {
    pub fn new(url: Url, credential: Option<Credential>) -> Self {
        TargetRepository {
            repository: RepositoryRef::new("target", url).with_credential(credential),
        }
    }

    pub fn url(&self) -> &Url {
        self.repository.url()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.repository.credential()
    }

    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }
}

impl FromStr for TargetRepository {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let url = Url::parse(s).with_context(|| format!("invalid target URL `{}`", s))?;
        match url.scheme() {
            "file" | "http" | "https" => Ok(TargetRepository::new(url, None)),
            other => bail!("unsupported target scheme `{}` in {}", other, s),
        }
    }
}
