//! Document ingestion: fetch the source, extract pages, build chunks.

use crate::parser::TextExtractor;
use crate::types::{Chunk, IngestStats};
use docchat_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Chunks produced by one ingestion run.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub chunks: Vec<Chunk>,
    pub stats: IngestStats,
}

/// Turns a PDF location into page chunks.
#[derive(Clone)]
pub struct Ingestor {
    extractor: Arc<dyn TextExtractor>,
    http: reqwest::Client,
}

impl Ingestor {
    /// Create an ingestor around an already-initialised extractor.
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            extractor,
            http: reqwest::Client::new(),
        }
    }

    /// Bound each remote fetch by `timeout_secs`, when set.
    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        self.http = builder
            .build()
            .map_err(|e| AppError::Ingest(format!("Failed to create HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Read the raw document from an `http(s)://` URL or a local path.
    pub async fn fetch(&self, location: &str) -> AppResult<Vec<u8>> {
        if location.starts_with("http://") || location.starts_with("https://") {
            tracing::info!("Fetching document from {}", location);

            let response = self
                .http
                .get(location)
                .send()
                .await
                .map_err(|e| AppError::Ingest(format!("Failed to fetch PDF: {}", e)))?;

            if !response.status().is_success() {
                return Err(AppError::Ingest(format!(
                    "Failed to fetch PDF: {}",
                    response.status()
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| AppError::Ingest(format!("Failed to fetch PDF: {}", e)))?;
            Ok(bytes.to_vec())
        } else {
            tracing::info!("Reading document from {}", location);
            tokio::fs::read(location)
                .await
                .map_err(|e| AppError::Ingest(format!("Failed to read PDF {}: {}", location, e)))
        }
    }

    /// Extract one chunk per non-blank page.
    ///
    /// Pages are visited in ascending order and each is finished before the
    /// next one starts.
    pub async fn ingest(&self, title: &str, bytes: &[u8]) -> AppResult<Ingested> {
        let start = Instant::now();
        let source = self.extractor.open(bytes)?;
        let pages_seen = source.page_count();

        let mut chunks = Vec::new();
        for page in 1..=pages_seen {
            let content = source.page_fragments(page)?.join(" ");
            if content.trim().is_empty() {
                tracing::debug!("Skipping blank page {}", page);
            } else {
                chunks.push(Chunk::page(title, page, content));
            }
            tokio::task::yield_now().await;
        }

        let stats = IngestStats {
            pages_seen,
            chunks_kept: chunks.len() as u32,
            bytes: bytes.len() as u64,
            duration_secs: start.elapsed().as_secs_f64(),
        };

        tracing::info!(
            "Ingested '{}': {} of {} pages kept, {} bytes in {:.2}s",
            title,
            stats.chunks_kept,
            stats.pages_seen,
            stats.bytes,
            stats.duration_secs
        );

        Ok(Ingested { chunks, stats })
    }

    /// Fetch and ingest in one step.
    pub async fn load(&self, title: &str, location: &str) -> AppResult<Ingested> {
        let bytes = self.fetch(location).await?;
        self.ingest(title, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::build_pdf;
    use crate::parser::LopdfExtractor;
    use crate::tests::support::PagedText;
    use std::collections::HashSet;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP response on a local port and return its URL.
    async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/pdf\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/guide.pdf", addr)
    }

    fn ingestor(pages: &[&[&str]]) -> Ingestor {
        Ingestor::new(Arc::new(PagedText::new(pages)))
    }

    #[tokio::test]
    async fn test_blank_pages_dropped() {
        let ingested = ingestor(&[&["a", "b"], &["   "], &[], &["c"]])
            .ingest("Guide", b"%PDF")
            .await
            .unwrap();

        let pages: Vec<Option<u32>> = ingested.chunks.iter().map(|c| c.page_number).collect();
        assert_eq!(pages, vec![Some(1), Some(4)]);
        assert_eq!(ingested.chunks[0].content, "a b");
        assert_eq!(ingested.stats.pages_seen, 4);
        assert_eq!(ingested.stats.chunks_kept, 2);
    }

    #[tokio::test]
    async fn test_chunk_invariants() {
        let ingestor = ingestor(&[&["one"], &["two"], &[""], &["four"]]);
        let first = ingestor.ingest("Guide", b"").await.unwrap();
        let second = ingestor.ingest("Guide", b"").await.unwrap();

        assert!(first.chunks.len() as u32 <= first.stats.pages_seen);
        assert!(first.chunks.iter().all(|c| !c.content.trim().is_empty()));

        let ids: HashSet<&str> = first.chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), first.chunks.len());

        let again: Vec<&str> = second.chunks.iter().map(|c| c.id.as_str()).collect();
        let before: Vec<&str> = first.chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(before, again);
    }

    #[tokio::test]
    async fn test_parse_failure_is_ingest_error() {
        let ingestor = Ingestor::new(Arc::new(PagedText::failing("corrupt xref")));
        let err = ingestor.ingest("Guide", b"").await.unwrap_err();
        assert!(matches!(err, AppError::Ingest(_)));
    }

    #[tokio::test]
    async fn test_load_local_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("guide.pdf");
        std::fs::write(&path, build_pdf(&[&["Hello from page one"], &[]])).unwrap();

        let ingestor = Ingestor::new(Arc::new(LopdfExtractor::new()));
        let ingested = ingestor
            .load("guide.pdf", path.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(ingested.chunks.len(), 1);
        assert_eq!(ingested.chunks[0].id, "pdf-guide.pdf-page-1");
        assert!(ingested.chunks[0].content.contains("Hello from page one"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.pdf");
        let err = ingestor(&[])
            .fetch(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Ingest(_)));
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let url = serve_once("404 Not Found", b"missing".to_vec()).await;

        let err = ingestor(&[]).fetch(&url).await.unwrap_err();
        assert!(matches!(err, AppError::Ingest(_)));
        assert_eq!(err.to_string(), "Failed to fetch PDF: 404 Not Found");
    }

    #[tokio::test]
    async fn test_load_remote_pdf() {
        let url = serve_once("200 OK", build_pdf(&[&["Remote page one"]])).await;

        let ingestor = Ingestor::new(Arc::new(LopdfExtractor::new()))
            .with_timeout(Some(10))
            .unwrap();
        let ingested = ingestor.load("Guide", &url).await.unwrap();

        assert_eq!(ingested.chunks.len(), 1);
        assert_eq!(ingested.chunks[0].id, "pdf-Guide-page-1");
        assert!(ingested.chunks[0].content.contains("Remote page one"));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/guide.pdf", listener.local_addr().unwrap());
        // Accept the connection and never answer
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let ingestor = ingestor(&[]).with_timeout(Some(1)).unwrap();
        let err = ingestor.fetch(&url).await.unwrap_err();
        assert!(matches!(err, AppError::Ingest(_)));
    }
}
