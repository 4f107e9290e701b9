//! Content fetching for classified locators.
//!
//! Local locators read through the filesystem; remote locators perform a
//! plain GET over a pooled [`Agent`]. Non-2xx statuses are failures that
//! carry the status and an excerpt of the response body.

use std::time::Duration;

use ureq::Agent;

use crate::locator::Locator;

/// Longest error-body excerpt carried in a [`SourceErrorKind::Status`].
const BODY_EXCERPT_LEN: usize = 200;

/// Failure to produce content for a locator.
#[derive(Debug, thiserror::Error)]
#[error("source {locator}: {kind}")]
pub struct SourceError {
    /// The locator as resolved (path or URL).
    pub locator: String,
    pub kind: SourceErrorKind,
}

/// Kind of content fetch error.
#[derive(Debug, thiserror::Error)]
pub enum SourceErrorKind {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Create an HTTP agent with the specified timeout.
///
/// Build one per top-level parse so that every remote include of that call
/// shares a connection pool and a single timeout policy.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

impl Locator {
    /// Fetch the content this locator names.
    pub fn fetch(&self, agent: &Agent) -> Result<String, SourceError> {
        match self {
            Self::Local(path) => {
                tracing::debug!(path = %path.display(), "reading local source");
                std::fs::read_to_string(path).map_err(|e| SourceError {
                    locator: path.to_string_lossy().into_owned(),
                    kind: SourceErrorKind::Io(e),
                })
            }
            Self::Remote(url) => fetch_remote(agent, url),
        }
    }
}

fn fetch_remote(agent: &Agent, url: &str) -> Result<String, SourceError> {
    tracing::debug!(url, "fetching remote source");

    let response = agent.get(url).call().map_err(|e| SourceError {
        locator: url.to_owned(),
        kind: SourceErrorKind::Http(e.to_string()),
    })?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let excerpt = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        tracing::warn!(url, status, "remote source returned error status");
        return Err(SourceError {
            locator: url.to_owned(),
            kind: SourceErrorKind::Status {
                status,
                body: truncate(&excerpt),
            },
        });
    }

    body.read_to_string().map_err(|e| SourceError {
        locator: url.to_owned(),
        kind: SourceErrorKind::Http(e.to_string()),
    })
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::path::PathBuf;

    use super::*;

    /// Serve one canned HTTP response on a loopback listener.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0_u8; 1024];
            let _ = stream.read(&mut buf);
            let response = format!(
                "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/doc.txt")
    }

    #[test]
    fn test_fetch_local() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("child.txt");
        std::fs::write(&path, "child line\n").unwrap();

        let agent = create_agent(Duration::from_secs(5));
        let content = Locator::Local(path).fetch(&agent).unwrap();
        assert_eq!(content, "child line\n");
    }

    #[test]
    fn test_fetch_local_missing() {
        let agent = create_agent(Duration::from_secs(5));
        let err = Locator::Local(PathBuf::from("/nonexistent/child.txt"))
            .fetch(&agent)
            .unwrap_err();
        assert!(matches!(err.kind, SourceErrorKind::Io(_)));
        assert!(err.locator.contains("child.txt"));
    }

    #[test]
    fn test_fetch_remote_ok() {
        let url = serve_once("HTTP/1.1 200 OK", "remote line\n");
        let agent = create_agent(Duration::from_secs(5));
        let content = Locator::Remote(url).fetch(&agent).unwrap();
        assert_eq!(content, "remote line\n");
    }

    #[test]
    fn test_fetch_remote_not_found() {
        let url = serve_once("HTTP/1.1 404 Not Found", "gone");
        let agent = create_agent(Duration::from_secs(5));
        let err = Locator::Remote(url).fetch(&agent).unwrap_err();
        match err.kind {
            SourceErrorKind::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "gone");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_remote_connection_refused() {
        // Bind and drop to get a port with no listener.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let agent = create_agent(Duration::from_secs(5));
        let err = Locator::Remote(format!("http://127.0.0.1:{port}/doc.txt"))
            .fetch(&agent)
            .unwrap_err();
        assert!(matches!(err.kind, SourceErrorKind::Http(_)));
    }

    #[test]
    fn test_truncate_long_body() {
        let long = "x".repeat(500);
        let excerpt = truncate(&long);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.len(), BODY_EXCERPT_LEN + 3);
    }
}
