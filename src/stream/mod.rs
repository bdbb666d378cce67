//! Live MJPEG streaming.
//!
//! A connection that requests the stream route gets a
//! `multipart/x-mixed-replace` head and is then handed to the
//! [`StreamBroadcaster`], which writes every published frame to it as one
//! part:
//!
//! ```text
//! Content-Type: image/jpeg
//!
//! <jpeg bytes>--OSMZ_boundary
//! ```
//!
//! The framing is the minimal one browsers accept; it is not normalized to
//! strict multipart CRLF rules.

pub mod broadcaster;
pub mod source;

pub use broadcaster::{StreamBroadcaster, SubscriberId};
pub use source::FileFrameSource;

/// Multipart boundary token.
pub const BOUNDARY: &str = "OSMZ_boundary";

/// Written before each frame.
pub const PART_PREAMBLE: &[u8] = b"Content-Type: image/jpeg\n\n";

/// `Content-Type` of the stream response.
pub fn multipart_content_type() -> String {
    format!("multipart/x-mixed-replace; boundary=\"{}\"", BOUNDARY)
}

/// Written after each frame.
pub fn boundary_marker() -> String {
    format!("--{}", BOUNDARY)
}
