//! Maps request paths onto files below the storage root.

use std::io::ErrorKind;
use std::path::PathBuf;

use bytes::Bytes;

use crate::http::mime;

/// Served in place of a directory root.
pub const INDEX_PATH: &str = "/index.html";
/// Optional override for the Not-Found body.
pub const NOT_FOUND_PATH: &str = "/404.html";
/// Optional override for the Busy body.
pub const BUSY_PATH: &str = "/503.html";

pub const NOT_FOUND_BODY: &str = "<html>\n<body>\n<p>404 Not found</p>\n</body>\n</html>";
pub const BUSY_BODY: &str = "<html>\n<body>\n<p>503 Server is busy</p>\n</body>\n</html>";

/// A file read from storage together with its content type.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub bytes: Bytes,
    pub mime_type: &'static str,
}

impl FileContent {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Resolves URL paths to files rooted at a storage directory.
#[derive(Debug, Clone)]
pub struct FileResolver {
    root: PathBuf,
}

impl FileResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Rewrites `/` to `/index.html`; every other path is left alone.
    pub fn target_path(path: &str) -> &str {
        if path == "/" { INDEX_PATH } else { path }
    }

    /// Filesystem location for a URL path. `/foo` maps to `<root>/foo`.
    pub fn file_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Reads the file behind `path`.
    ///
    /// Returns `Ok(None)` when nothing regular exists there. The whole file is
    /// read up front so the declared length always matches what is sent.
    pub async fn resolve(&self, path: &str) -> std::io::Result<Option<FileContent>> {
        let target = Self::target_path(path);
        let Some(bytes) = self.read_regular_file(target).await? else {
            return Ok(None);
        };

        Ok(Some(FileContent {
            bytes,
            mime_type: mime::from_path(target),
        }))
    }

    /// Body for a 404: `<root>/404.html` if present, else the built-in page.
    pub async fn not_found_body(&self) -> Bytes {
        self.override_or(NOT_FOUND_PATH, NOT_FOUND_BODY).await
    }

    /// Body for a 503: `<root>/503.html` if present, else the built-in page.
    pub async fn busy_body(&self) -> Bytes {
        self.override_or(BUSY_PATH, BUSY_BODY).await
    }

    async fn override_or(&self, path: &str, fallback: &'static str) -> Bytes {
        match self.read_regular_file(path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => Bytes::from_static(fallback.as_bytes()),
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to read override page, using built-in body");
                Bytes::from_static(fallback.as_bytes())
            }
        }
    }

    async fn read_regular_file(&self, path: &str) -> std::io::Result<Option<Bytes>> {
        let file = self.file_path(path);

        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            // Removed between the metadata check and the read.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}
