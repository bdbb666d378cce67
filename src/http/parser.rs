use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::http::request::{Method, Request};

/// Parses a single request line.
///
/// The path is whatever sits between the method token and the first `HTTP`
/// after it; the version is the rest of the line after the path. Neither part
/// is validated, so a line without `HTTP` yields its whole remainder as path.
pub fn parse_request_line(line: &str) -> Request {
    let method = Method::detect(line);

    let token = match method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::UNKNOWN => {
            return Request {
                method,
                path: None,
                version: None,
            };
        }
    };

    let path = substring_before(substring_after(line, token), "HTTP").trim();
    let version = substring_after(line, path).trim();

    Request {
        method,
        path: Some(path.to_string()),
        version: Some(version.to_string()),
    }
}

/// Reads the header block from `reader` and builds a [`Request`] from its
/// first line.
///
/// Lines are consumed until an empty line or end of input. Only the first
/// line is interpreted; an unknown method is logged and the remaining lines
/// are still drained. There is no limit on how long a client may take to
/// send the terminating blank line.
pub async fn read_request<R>(reader: &mut R) -> std::io::Result<Request>
where
    R: AsyncBufRead + Unpin,
{
    let mut request: Option<Request> = None;
    let mut raw = Vec::with_capacity(256);

    loop {
        raw.clear();
        let n = reader.read_until(b'\n', &mut raw).await?;
        if n == 0 {
            break;
        }

        let text = String::from_utf8_lossy(&raw);
        let line = text.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }

        if request.is_none() {
            let parsed = parse_request_line(line);
            if parsed.method == Method::UNKNOWN {
                tracing::debug!(line = %line, "Invalid or unknown request line");
            }
            request = Some(parsed);
        } else {
            tracing::trace!(line = %line, "Header line");
        }
    }

    Ok(request.unwrap_or_else(Request::empty))
}

fn substring_after<'a>(s: &'a str, delimiter: &str) -> &'a str {
    match s.find(delimiter) {
        Some(idx) => &s[idx + delimiter.len()..],
        None => s,
    }
}

fn substring_before<'a>(s: &'a str, delimiter: &str) -> &'a str {
    match s.find(delimiter) {
        Some(idx) => &s[..idx],
        None => s,
    }
}
