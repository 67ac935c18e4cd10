//! Network retrieval of release archives and checksum manifests.
//!
//! Provides a trait-based abstraction so the install pipeline can be
//! exercised without network access. A 404 is an expected outcome (the
//! release simply does not publish that file) and is reported as
//! [`FetchOutcome::NotFound`]; every other failure is a [`DownloadError`].

use log::debug;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

/// Default network timeout for a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffer size used while streaming a response body to disk.
const COPY_CHUNK: usize = 8192;

/// Whether a fetched resource exists on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// The resource was retrieved.
    Found(T),
    /// The server answered 404.
    NotFound,
}

impl<T> FetchOutcome<T> {
    /// Convert into an `Option`, discarding the not-found distinction.
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

/// Trait for retrieving release files.
///
/// # Examples
///
/// ```
/// use launchpad_installer::artefact::download::HttpFetcher;
///
/// let fetcher = HttpFetcher::default();
/// // fetcher.fetch_text("https://example.test/checksums.txt") in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait AssetFetcher {
    /// Download `url` into `dest`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error for any transport failure or non-404 HTTP status,
    /// or when `dest` cannot be written.
    fn fetch_binary(&self, url: &str, dest: &Path) -> Result<FetchOutcome<()>, DownloadError>;

    /// Download `url` and return the body decoded as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error for any transport failure or non-404 HTTP status.
    fn fetch_text(&self, url: &str) -> Result<FetchOutcome<String>, DownloadError>;
}

/// Errors arising from release downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request failed or returned a non-404 error status.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The response body could not be written locally.
    #[error("I/O error writing download: {0}")]
    Io(#[from] io::Error),
}

/// HTTP fetcher backed by a `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    fn get(&self, url: &str) -> Result<FetchOutcome<ureq::http::Response<ureq::Body>>, DownloadError> {
        debug!("fetching {url}");
        match self.agent.get(url).call() {
            Ok(response) => Ok(FetchOutcome::Found(response)),
            Err(ureq::Error::StatusCode(404)) => {
                debug!("{url} returned 404");
                Ok(FetchOutcome::NotFound)
            }
            Err(err) => Err(map_ureq_error(url, &err)),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch_binary(&self, url: &str, dest: &Path) -> Result<FetchOutcome<()>, DownloadError> {
        let FetchOutcome::Found(response) = self.get(url)? else {
            return Ok(FetchOutcome::NotFound);
        };
        let mut file = File::create(dest)?;
        let mut body = response.into_body();
        stream_to_file(url, &mut body.as_reader(), &mut file)?;
        file.sync_all()?;
        Ok(FetchOutcome::Found(()))
    }

    fn fetch_text(&self, url: &str) -> Result<FetchOutcome<String>, DownloadError> {
        let FetchOutcome::Found(response) = self.get(url)? else {
            return Ok(FetchOutcome::NotFound);
        };
        let bytes = response
            .into_body()
            .read_to_vec()
            .map_err(|e| map_ureq_error(url, &e))?;
        // Undecodable bytes are replaced; the manifest parser skips any
        // line they make unusable.
        Ok(FetchOutcome::Found(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    }
}

/// Copy `reader` into `file`, reporting read failures as [`DownloadError::Http`]
/// and local write failures as [`DownloadError::Io`].
fn stream_to_file(
    url: &str,
    reader: &mut dyn Read,
    file: &mut dyn Write,
) -> Result<(), DownloadError> {
    let mut buffer = [0u8; COPY_CHUNK];
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(DownloadError::Http {
                    url: url.to_owned(),
                    reason: e.to_string(),
                });
            }
        };
        let chunk = buffer.get(..bytes_read).unwrap_or_default();
        file.write_all(chunk)?;
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    DownloadError::Http {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_ureq_error_keeps_url_and_status() {
        let err = ureq::Error::StatusCode(500);
        let mapped = map_ureq_error("https://example.test/asset", &err);
        match mapped {
            DownloadError::Http { url, reason } => {
                assert_eq!(url, "https://example.test/asset");
                assert!(reason.contains("500"), "reason: {reason}");
            }
            DownloadError::Io(other) => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn found_converts_to_option() {
        assert_eq!(FetchOutcome::Found(3).found(), Some(3));
        assert_eq!(FetchOutcome::<u8>::NotFound.found(), None);
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2));
        // Port 9 on localhost is the discard service; it is closed on CI hosts,
        // so the connection is refused rather than answered with a status.
        let result = fetcher.fetch_text("http://127.0.0.1:9/checksums.txt");
        assert!(matches!(result, Err(DownloadError::Http { .. })));
    }

    /// Serve exactly one HTTP response on an ephemeral local port and
    /// return the base URL.
    fn serve_once(status: &str, body: &'static [u8]) -> String {
        use std::io::{BufRead, BufReader};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let status = status.to_owned();
        std::thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok_and(|n| n > 0) {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut stream = reader.into_inner();
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
            let _ = stream.flush();
        });
        format!("http://{addr}")
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5))
    }

    #[test]
    fn manifest_with_invalid_utf8_is_decoded_lossily() {
        let base = serve_once(
            "200 OK",
            b"# built by J\xf6rg\nabcd  launchpad_linux_amd64.tar.gz\n",
        );

        let outcome = fetcher()
            .fetch_text(&format!("{base}/checksums.txt"))
            .expect("manifest fetched");

        let FetchOutcome::Found(text) = outcome else {
            panic!("expected manifest body");
        };
        assert!(text.starts_with("# built by J\u{fffd}rg\n"), "text: {text:?}");
        assert_eq!(
            crate::artefact::checksum::lookup_checksum(&text, "launchpad_linux_amd64.tar.gz")
                .as_deref(),
            Some("abcd")
        );
    }

    #[test]
    fn text_404_is_not_found() {
        let base = serve_once("404 Not Found", b"missing");
        let outcome = fetcher()
            .fetch_text(&format!("{base}/checksums.txt"))
            .expect("404 is not an error");
        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[test]
    fn binary_404_is_not_found_and_writes_nothing() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dest = temp.path().join("asset.tar.gz");
        let base = serve_once("404 Not Found", b"missing");

        let outcome = fetcher()
            .fetch_binary(&format!("{base}/asset.tar.gz"), &dest)
            .expect("404 is not an error");

        assert_eq!(outcome, FetchOutcome::NotFound);
        assert!(!dest.exists());
    }

    #[test]
    fn server_error_is_a_network_error() {
        let base = serve_once("500 Internal Server Error", b"boom");
        let result = fetcher().fetch_text(&format!("{base}/checksums.txt"));
        assert!(
            matches!(result, Err(DownloadError::Http { ref reason, .. }) if reason.contains("500")),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn binary_body_is_written_to_dest() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dest = temp.path().join("asset.tar.gz");
        let base = serve_once("200 OK", b"archive bytes");

        let outcome = fetcher()
            .fetch_binary(&format!("{base}/asset.tar.gz"), &dest)
            .expect("download");

        assert_eq!(outcome, FetchOutcome::Found(()));
        assert_eq!(std::fs::read(&dest).expect("read dest"), b"archive bytes");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn local_write_failure_is_an_io_error() {
        let base = serve_once("200 OK", b"archive bytes");
        let result = fetcher().fetch_binary(
            &format!("{base}/asset.tar.gz"),
            Path::new("/dev/full"),
        );
        assert!(
            matches!(result, Err(DownloadError::Io(_))),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn stream_read_failure_is_a_network_error() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let mut sink = Vec::new();
        let err = stream_to_file("http://example.test/a", &mut FailingReader, &mut sink)
            .expect_err("read failure");
        assert!(matches!(err, DownloadError::Http { .. }));
    }
}
