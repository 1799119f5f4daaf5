//! Repository transport - moving single files to and from repositories.
//!
//! `file://` repositories are plain directory trees. `http(s)://`
//! repositories are read with `GET` and written with `PUT`, using HTTP basic
//! auth when the repository carries a credential.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use tempfile::NamedTempFile;
use url::Url;

use crate::core::RepositoryRef;
use crate::util::config::NetConfig;

const USER_AGENT: &str = concat!("ferry/", env!("CARGO_PKG_VERSION"));

/// Delay between attempts of a failed request.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Fetches and stores files in repositories.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    attempts: u32,
}

impl Transport {
    pub fn new(net: &NetConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(net.timeout())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Transport {
            client,
            attempts: net.attempts(),
        })
    }

    /// Download `path` from `repository` into `dest`.
    ///
    /// Returns `Ok(false)` when the repository does not have the file.
    pub fn download(&self, repository: &RepositoryRef, path: &str, dest: &Path) -> Result<bool> {
        let url = repository.join(path)?;

        match url.scheme() {
            "file" => {
                let src = file_path(&url)?;
                if !src.is_file() {
                    return Ok(false);
                }
                let bytes = std::fs::read(&src)
                    .with_context(|| format!("failed to read {}", src.display()))?;
                write_atomic(dest, &bytes)?;
                Ok(true)
            }
            "http" | "https" => self.retry(&url, || {
                let response = authenticated(self.client.get(url.clone()), repository)
                    .send()
                    .with_context(|| format!("GET {} failed", url))?;

                match response.status() {
                    StatusCode::NOT_FOUND | StatusCode::GONE => Ok(false),
                    status if status.is_success() => {
                        let bytes = response
                            .bytes()
                            .with_context(|| format!("failed to read body of {}", url))?;
                        write_atomic(dest, &bytes)?;
                        Ok(true)
                    }
                    status => bail!("GET {} returned {}", url, status),
                }
            }),
            other => bail!("unsupported repository scheme `{}` for {}", other, repository),
        }
    }

    /// Upload the file at `src` to `path` in `repository`.
    pub fn upload(&self, repository: &RepositoryRef, path: &str, src: &Path) -> Result<()> {
        let bytes =
            std::fs::read(src).with_context(|| format!("failed to read {}", src.display()))?;
        self.upload_bytes(repository, path, bytes)
    }

    /// Upload `bytes` to `path` in `repository`.
    pub fn upload_bytes(&self, repository: &RepositoryRef, path: &str, bytes: Vec<u8>) -> Result<()> {
        let url = repository.join(path)?;

        match url.scheme() {
            "file" => write_atomic(&file_path(&url)?, &bytes),
            "http" | "https" => self.retry(&url, || {
                let response = authenticated(self.client.put(url.clone()), repository)
                    .body(bytes.clone())
                    .send()
                    .with_context(|| format!("PUT {} failed", url))?;

                let status = response.status();
                if !status.is_success() {
                    bail!("PUT {} returned {}", url, status);
                }
                Ok(())
            }),
            other => bail!("unsupported repository scheme `{}` for {}", other, repository),
        }
    }

    fn retry<T>(&self, url: &Url, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts => {
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {:#}",
                        attempt,
                        self.attempts,
                        url,
                        e
                    );
                    std::thread::sleep(RETRY_DELAY);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn authenticated(request: RequestBuilder, repository: &RepositoryRef) -> RequestBuilder {
    match repository.credential() {
        Some(credential) => request.basic_auth(&credential.username, credential.password.as_ref()),
        None => request,
    }
}

fn file_path(url: &Url) -> Result<std::path::PathBuf> {
    url.to_file_path()
        .map_err(|_| anyhow::anyhow!("invalid file URL: {}", url))
}

/// Write `bytes` to `dest` through a temporary file in the same directory,
/// so readers never observe a partial file.
pub(crate) fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    let parent = dest
        .parent()
        .ok_or_else(|| anyhow::anyhow!("invalid destination: {}", dest.display()))?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory: {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    tmp.persist(dest)
        .with_context(|| format!("failed to persist {}", dest.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Credential;
    use std::io::Read;
    use std::net::TcpListener;
    use tempfile::TempDir;

    fn file_repo(id: &str, dir: &Path) -> RepositoryRef {
        RepositoryRef::new(id, Url::from_directory_path(dir).unwrap())
    }

    /// Accept one HTTP request, answer `201 Created` and return the request
    /// head.
    fn serve_once(listener: TcpListener) -> std::thread::JoinHandle<String> {
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            let head_end = loop {
                if let Some(i) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break i;
                }
                let n = stream.read(&mut buf).unwrap();
                assert!(n > 0, "connection closed before the request head");
                request.extend_from_slice(&buf[..n]);
            };

            let head = String::from_utf8_lossy(&request[..head_end]).into_owned();
            let body_len: usize = header(&head, "content-length")
                .map(|v| v.parse().unwrap())
                .unwrap_or(0);
            while request.len() < head_end + 4 + body_len {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            stream
                .write_all(b"HTTP/1.1 201 Created\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .unwrap();
            head
        })
    }

    fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    #[test]
    fn test_credential_becomes_basic_auth() {
        let repo = RepositoryRef::new(
            "target",
            Url::parse("https://mirror.example.com/releases").unwrap(),
        )
        .with_credential(Some(Credential::new("deployer", Some("hunter2".to_string()))));

        let request = authenticated(Client::new().put(repo.join("a.jar").unwrap()), &repo)
            .build()
            .unwrap();
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Basic ZGVwbG95ZXI6aHVudGVyMg=="
        );

        let anonymous = repo.clone().with_credential(None);
        let request = authenticated(Client::new().put(anonymous.join("a.jar").unwrap()), &anonymous)
            .build()
            .unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_http_upload_sends_credential() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/releases/", listener.local_addr().unwrap());
        let server = serve_once(listener);

        let repo = RepositoryRef::new("target", Url::parse(&url).unwrap())
            .with_credential(Some(Credential::new("alice", Some("from-env".to_string()))));
        let transport = Transport::new(&NetConfig {
            retries: Some(1),
            ..NetConfig::default()
        })
        .unwrap();

        transport
            .upload_bytes(&repo, "com/example/lib/2.0/lib-2.0.jar", b"jar".to_vec())
            .unwrap();

        let head = server.join().unwrap();
        assert!(head.starts_with("PUT /releases/com/example/lib/2.0/lib-2.0.jar "));
        assert_eq!(header(&head, "authorization"), Some("Basic YWxpY2U6ZnJvbS1lbnY="));
    }

    #[test]
    fn test_file_round_trip() {
        let tmp = TempDir::new().unwrap();
        let repo = file_repo("local", &tmp.path().join("repo"));
        let transport = Transport::new(&NetConfig::default()).unwrap();

        transport
            .upload_bytes(&repo, "com/example/lib/2.0/lib-2.0.jar", b"jar-bytes".to_vec())
            .unwrap();

        let dest = tmp.path().join("cache/lib-2.0.jar");
        assert!(transport
            .download(&repo, "com/example/lib/2.0/lib-2.0.jar", &dest)
            .unwrap());
        assert_eq!(std::fs::read(&dest).unwrap(), b"jar-bytes");
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let repo = file_repo("local", tmp.path());
        let transport = Transport::new(&NetConfig::default()).unwrap();

        let dest = tmp.path().join("out.jar");
        assert!(!transport.download(&repo, "com/example/ghost/1/ghost-1.jar", &dest).unwrap());
        assert!(!dest.exists());
    }

    #[test]
    fn test_unsupported_scheme() {
        let tmp = TempDir::new().unwrap();
        let repo = RepositoryRef::new("ftp", Url::parse("ftp://repo.example.com/").unwrap());
        let transport = Transport::new(&NetConfig::default()).unwrap();

        let err = transport
            .download(&repo, "a/b/1/b-1.jar", &tmp.path().join("b.jar"))
            .unwrap_err();
        assert!(err.to_string().contains("unsupported repository scheme `ftp`"));
    }

    #[test]
    fn test_retry_gives_up_after_configured_attempts() {
        let transport = Transport::new(&NetConfig {
            retries: Some(2),
            ..NetConfig::default()
        })
        .unwrap();
        let url = Url::parse("https://repo.example.com/x").unwrap();

        let mut calls = 0;
        let result: Result<()> = transport.retry(&url, || {
            calls += 1;
            bail!("boom")
        });

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
