use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::http::mime;
use crate::http::request::Method;
use crate::http::resolver::FileResolver;

/// Protocol used when the client did not name one.
pub const DEFAULT_PROTOCOL: &str = "HTTP/1.0";

const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The response kinds the server can produce.
///
/// - `Ok` (200): file served, or stream started
/// - `NotFound` (404): nothing at the requested path
/// - `Busy` (503): every admission slot is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// 200 OK
    Ok,
    /// 404 Not found
    NotFound,
    /// 503 Server too busy
    Busy,
}

impl ResponseKind {
    /// Returns the numeric status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use framecast::http::response::ResponseKind;
    /// assert_eq!(ResponseKind::Ok.as_u16(), 200);
    /// assert_eq!(ResponseKind::Busy.as_u16(), 503);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            ResponseKind::Ok => 200,
            ResponseKind::NotFound => 404,
            ResponseKind::Busy => 503,
        }
    }

    /// Returns the reason phrase sent on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            ResponseKind::Ok => "OK",
            ResponseKind::NotFound => "Not found",
            ResponseKind::Busy => "Server too busy",
        }
    }
}

/// Everything that goes into a response's head.
///
/// `content_length` of `None` omits the header entirely; that is how the
/// unbounded stream body is announced.
#[derive(Debug, Clone)]
pub struct ResponseHeader {
    /// Target path after `/` rewriting, if the response is for a path
    pub path: Option<String>,
    pub mime_type: String,
    pub kind: ResponseKind,
    pub timestamp: DateTime<Utc>,
    pub method: Method,
    pub content_length: Option<u64>,
    pub protocol_version: String,
}

impl ResponseHeader {
    pub fn new(kind: ResponseKind, mime_type: impl Into<String>) -> Self {
        Self {
            path: None,
            mime_type: mime_type.into(),
            kind,
            timestamp: Utc::now(),
            method: Method::GET,
            content_length: None,
            protocol_version: DEFAULT_PROTOCOL.to_string(),
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    /// Serializes the status line and headers, including the blank line that
    /// ends the head.
    pub fn serialize(&self) -> String {
        let mut out = format!(
            "{} {} {}\r\n",
            self.protocol_version,
            self.kind.as_u16(),
            self.kind.reason_phrase()
        );
        out.push_str(&format!("Date: {}\r\n", self.timestamp.format(DATE_FORMAT)));
        out.push_str(&format!("Content-Type: {}\r\n", self.mime_type));
        if let Some(len) = self.content_length {
            out.push_str(&format!("Content-Length: {}\r\n", len));
        }
        out.push_str("\r\n");
        out
    }
}

/// A head plus the exact body it describes.
#[derive(Debug, Clone)]
pub struct Response {
    pub header: ResponseHeader,
    pub body: Bytes,
}

impl Response {
    fn with_body(header: ResponseHeader, body: Bytes) -> Self {
        let header = header.content_length(body.len() as u64);
        Self { header, body }
    }
}

/// Builds responses for each [`ResponseKind`], reading content through a
/// [`FileResolver`].
#[derive(Debug, Clone)]
pub struct Catalog {
    resolver: FileResolver,
}

impl Catalog {
    pub fn new(resolver: FileResolver) -> Self {
        Self { resolver }
    }

    /// Builds the response for `kind`.
    ///
    /// An `Ok` whose file cannot be found is downgraded to `NotFound` here,
    /// before anything is serialized, so the declared length is that of the
    /// body actually sent.
    pub async fn render(
        &self,
        kind: ResponseKind,
        path: Option<&str>,
        method: Method,
        protocol: &str,
    ) -> Response {
        let target = path.map(FileResolver::target_path);

        let response = match (kind, target) {
            (ResponseKind::Ok, Some(target)) => match self.resolver.resolve(target).await {
                Ok(Some(content)) => {
                    tracing::debug!(path = %target, bytes = content.len(), "Resolved file");
                    Response::with_body(
                        ResponseHeader::new(ResponseKind::Ok, content.mime_type),
                        content.bytes,
                    )
                }
                Ok(None) => self.not_found().await,
                Err(e) => {
                    tracing::warn!(path = %target, error = %e, "Failed to read file, answering 404");
                    self.not_found().await
                }
            },
            (ResponseKind::Ok, None) | (ResponseKind::NotFound, _) => self.not_found().await,
            (ResponseKind::Busy, _) => self.busy().await,
        };

        let mut header = response.header.method(method).protocol_version(protocol);
        header.path = target.map(str::to_string);

        Response {
            header,
            body: response.body,
        }
    }

    /// Head for the unbounded multipart stream: no `Content-Length`.
    pub fn stream_header(&self, path: &str, method: Method, protocol: &str) -> ResponseHeader {
        ResponseHeader::new(ResponseKind::Ok, crate::stream::multipart_content_type())
            .path(path)
            .method(method)
            .protocol_version(protocol)
    }

    async fn not_found(&self) -> Response {
        Response::with_body(
            ResponseHeader::new(ResponseKind::NotFound, mime::DEFAULT_MIME),
            self.resolver.not_found_body().await,
        )
    }

    async fn busy(&self) -> Response {
        Response::with_body(
            ResponseHeader::new(ResponseKind::Busy, mime::DEFAULT_MIME),
            self.resolver.busy_body().await,
        )
    }
}
