//! Image fetching collaborators

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::FetchError;

/// Read size for streamed fetches
const CHUNK_SIZE: usize = 64 * 1024;

/// Progress callback, receives the fraction fetched so far (0.0..=1.0)
pub type ProgressCallback = Box<dyn Fn(f32) + Send + Sync>;

/// A fetch of one image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    /// Bearer token for authenticated stores
    pub credential: Option<String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, credential: Option<String>) -> Self {
        Self {
            url: url.into(),
            credential,
        }
    }

    /// `Authorization` header value, if a credential is attached
    pub fn authorization(&self) -> Option<String> {
        self.credential
            .as_deref()
            .map(|token| format!("Bearer {token}"))
    }
}

/// Source of decodable image bytes
pub trait ImageFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        request: FetchRequest,
        progress: ProgressCallback,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Reads local files. Accepts plain paths and `file://` URLs.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative references against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        let path = match url.strip_prefix("file://") {
            Some(path) => path,
            None if url.contains("://") => return Err(FetchError::Unsupported(url.to_string())),
            None => url,
        };
        let path = PathBuf::from(path);
        Ok(match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        })
    }
}

impl ImageFetcher for FileFetcher {
    async fn fetch(
        &self,
        request: FetchRequest,
        progress: ProgressCallback,
    ) -> Result<Vec<u8>, FetchError> {
        let path = self.resolve(&request.url)?;
        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(request.url));
            }
            Err(e) => return Err(e.into()),
        };

        let total = file.metadata().await?.len() as usize;
        let mut bytes = Vec::with_capacity(total);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..read]);
            if total > 0 {
                progress((bytes.len() as f32 / total as f32).min(1.0));
            }
        }
        progress(1.0);

        debug!("FileFetcher: read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }
}

/// In-memory image store
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    images: HashMap<String, Vec<u8>>,
    /// References that never resolve
    stalled: HashSet<String>,
    delay: Option<Duration>,
    required_token: Option<String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(url.into(), bytes);
    }

    pub fn with_image(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// Make fetches of `url` hang forever
    pub fn with_stalled(mut self, url: impl Into<String>) -> Self {
        self.stalled.insert(url.into());
        self
    }

    /// Delay every fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reject requests not carrying this bearer token
    pub fn with_required_token(mut self, token: impl Into<String>) -> Self {
        self.required_token = Some(token.into());
        self
    }
}

impl ImageFetcher for MemoryFetcher {
    async fn fetch(
        &self,
        request: FetchRequest,
        progress: ProgressCallback,
    ) -> Result<Vec<u8>, FetchError> {
        if let Some(token) = &self.required_token
            && request.authorization() != Some(format!("Bearer {token}"))
        {
            return Err(FetchError::Unauthorized);
        }
        if self.stalled.contains(&request.url) {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let bytes = self
            .images
            .get(&request.url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(request.url.clone()))?;
        progress(0.5);
        progress(1.0);
        Ok(bytes)
    }
}
