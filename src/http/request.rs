use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

/// Request methods recognised by the server.
///
/// Detection is deliberately loose (see [`Method::detect`]): anything that is
/// neither GET nor POST is `UNKNOWN` and never gets a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Treated exactly like GET; the body is never read
    POST,
    /// Anything else
    UNKNOWN,
}

impl Method {
    /// Detects the method from a raw request line.
    ///
    /// `"GET"` anywhere in the line wins; POST is only recognised when the
    /// line is exactly `"POST"`.
    ///
    /// # Example
    ///
    /// ```
    /// # use framecast::http::request::Method;
    /// assert_eq!(Method::detect("GET / HTTP/1.0"), Method::GET);
    /// assert_eq!(Method::detect("POST"), Method::POST);
    /// assert_eq!(Method::detect("POST / HTTP/1.0"), Method::UNKNOWN);
    /// ```
    pub fn detect(line: &str) -> Self {
        if line.contains("GET") {
            Method::GET
        } else if line == "POST" {
            Method::POST
        } else {
            Method::UNKNOWN
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as extracted from the first line a client sends.
///
/// Header lines after the first are consumed but not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The detected method
    pub method: Method,
    /// Raw path between the method token and `HTTP`, trimmed
    pub path: Option<String>,
    /// Whatever followed the path on the request line, trimmed
    pub version: Option<String>,
}

impl Request {
    /// A request for which no line has been seen yet.
    pub fn empty() -> Self {
        Self {
            method: Method::UNKNOWN,
            path: None,
            version: None,
        }
    }

    /// Whether the request deserves a response: a known method and a
    /// non-empty path.
    pub fn is_serviceable(&self) -> bool {
        self.method != Method::UNKNOWN && self.path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// The path used for routing and file lookup.
    ///
    /// Query and fragment are dropped, dot segments collapsed and escapes
    /// decoded, so `/my%20file.txt` and `/my file.txt` name the same file.
    /// The result always starts with `/` and never climbs above the root.
    /// `None` when there is no path, it cannot be interpreted as one, or an
    /// escaped `/` would turn into a `..` segment once decoded.
    pub fn target(&self) -> Option<String> {
        let raw = self.path.as_deref().filter(|p| !p.is_empty())?;

        let url = Url::parse("http://localhost/")
            .and_then(|base| base.join(raw))
            .ok()?;
        let decoded = percent_decode_str(url.path()).decode_utf8().ok()?;

        if decoded.split(['/', '\\']).any(|segment| segment == "..") {
            return None;
        }
        Some(decoded.into_owned())
    }

    /// Protocol version to answer with. Empty or missing versions fall back
    /// to `HTTP/1.0`.
    pub fn response_version(&self) -> &str {
        match self.version.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => super::response::DEFAULT_PROTOCOL,
        }
    }
}
