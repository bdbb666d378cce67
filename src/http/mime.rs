//! MIME type detection based on file extensions.

/// Content type used when an extension is missing or unknown.
pub const DEFAULT_MIME: &str = "text/html";

/// Returns the MIME type for `path` based on its extension.
///
/// Matching is case-insensitive. Paths without an extension, or with one the
/// table does not know, map to [`DEFAULT_MIME`].
///
/// # Example
///
/// ```
/// # use framecast::http::mime::from_path;
/// assert_eq!(from_path("/img/cat.JPG"), "image/jpeg");
/// assert_eq!(from_path("/README"), "text/html");
/// ```
pub fn from_path(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => from_extension(ext).unwrap_or(DEFAULT_MIME),
        _ => DEFAULT_MIME,
    }
}

/// Looks up a single extension (without the leading dot).
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "xml" => "text/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "wasm" => "application/wasm",
        _ => return None,
    };
    Some(mime)
}
