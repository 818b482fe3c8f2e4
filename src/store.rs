//! VIA project store client
//!
//! The store accepts a project document and answers with the id it was saved
//! under. [`ProjectStore`] is the seam; [`HttpStore`] talks to a real server.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::via::AnnotationDocument;

/// Store path, relative to the server's base URL
pub const STORE_ENDPOINT: &str = "/via/store/3.x.y/";

/// The store's answer to a project upload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SharedProject {
    /// Id the project was saved under
    pub pid: String,
}

/// Somewhere finished projects can be shared
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Upload a project and return the id the store assigned
    async fn create_shared_project(&self, doc: &AnnotationDocument) -> Result<SharedProject>;
}

/// Project store reached over HTTP
pub struct HttpStore {
    client: Client,
    endpoint: Url,
}

impl HttpStore {
    /// Client for the store at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("viasplit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Self::with_client(client, base_url)
    }

    /// Use a preconfigured client
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: store_endpoint(base_url)?,
        })
    }

    /// Resolved upload URL
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ProjectStore for HttpStore {
    #[instrument(skip(self, doc), fields(endpoint = %self.endpoint))]
    async fn create_shared_project(&self, doc: &AnnotationDocument) -> Result<SharedProject> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(doc)
            .send()
            .await
            .context("store request failed")?
            .error_for_status()
            .context("store rejected project")?;

        let shared: SharedProject = response
            .json()
            .await
            .context("store response has no project id")?;

        debug!("Store saved project as {}", shared.pid);
        Ok(shared)
    }
}

/// Resolve the store endpoint against `base_url`
///
/// The endpoint is absolute, so any path on `base_url` is replaced.
pub fn store_endpoint(base_url: &str) -> Result<Url> {
    let base = Url::parse(base_url).with_context(|| format!("invalid store URL: {base_url}"))?;
    Ok(base.join(STORE_ENDPOINT)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::via::{Project, ViaConfig};

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            store_endpoint("https://via.example.org").unwrap().as_str(),
            "https://via.example.org/via/store/3.x.y/"
        );
        assert_eq!(
            store_endpoint("http://localhost:9669/some/path/").unwrap().as_str(),
            "http://localhost:9669/via/store/3.x.y/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = store_endpoint("not a url").unwrap_err();
        assert!(err.to_string().contains("invalid store URL"));
    }

    #[test]
    fn test_http_store_endpoint() {
        let store = HttpStore::new("https://via.example.org/").unwrap();
        assert_eq!(store.endpoint().path(), STORE_ENDPOINT);
    }

    #[test]
    fn test_parse_store_response() {
        let shared: SharedProject =
            serde_json::from_str(r#"{"pid": "abc123", "rev": "1", "rev_timestamp": "1700000000"}"#)
                .unwrap();
        assert_eq!(shared.pid, "abc123");
    }

    /// In-memory store recording uploaded project names
    struct RecordingStore {
        uploaded: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProjectStore for RecordingStore {
        async fn create_shared_project(&self, doc: &AnnotationDocument) -> Result<SharedProject> {
            let mut uploaded = self.uploaded.lock().unwrap();
            uploaded.push(doc.project.pname.clone());
            Ok(SharedProject {
                pid: format!("pid{}", uploaded.len()),
            })
        }
    }

    /// Serve one canned HTTP response on a local port, returning the base URL
    /// and a handle yielding the raw request the client sent
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base, handle)
    }

    /// Headers received and the body matches its content-length
    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn sample_doc() -> AnnotationDocument {
        AnnotationDocument::new(Project::new("demo", "", None), ViaConfig::default())
    }

    #[tokio::test]
    async fn test_http_store_posts_json_and_reads_pid() {
        let (base, server) = serve_once("200 OK", r#"{"pid": "shared42", "rev": "1"}"#).await;
        let store = HttpStore::new(&base).unwrap();

        let shared = store.create_shared_project(&sample_doc()).await.unwrap();
        assert_eq!(shared.pid, "shared42");

        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("POST /via/store/3.x.y/ HTTP/1.1\r\n"), "{request}");
        assert!(lower.contains("content-type: application/json"), "{request}");
        assert!(request.contains(r#""pname":"demo""#), "{request}");
        assert!(request.contains("__VIA_PROJECT_ID__"), "{request}");
    }

    #[tokio::test]
    async fn test_http_store_rejects_error_status() {
        let (base, server) = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#).await;
        let store = HttpStore::new(&base).unwrap();

        let err = store.create_shared_project(&sample_doc()).await.unwrap_err();
        assert!(format!("{err:#}").contains("store rejected project"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_http_store_requires_pid() {
        let (base, server) = serve_once("200 OK", r#"{"status": "ok"}"#).await;
        let store = HttpStore::new(&base).unwrap();

        let err = store.create_shared_project(&sample_doc()).await.unwrap_err();
        assert!(format!("{err:#}").contains("no project id"));
        server.await.unwrap();
    }

    #[test]
    fn test_store_trait_object() {
        let store: Box<dyn ProjectStore> = Box::new(RecordingStore {
            uploaded: Mutex::new(Vec::new()),
        });
        let doc = AnnotationDocument::new(Project::new("demo", "", None), ViaConfig::default());

        let shared = tokio_test::block_on(store.create_shared_project(&doc)).unwrap();
        assert_eq!(shared.pid, "pid1");
    }
}
