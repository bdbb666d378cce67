//! Framecast - embeddable HTTP/1.0 file server with a live MJPEG stream
//!
//! Core library: request parsing, static responses, admission control and
//! frame fan-out.

pub mod config;
pub mod http;
pub mod server;
pub mod stream;

pub use config::Config;
pub use server::{Server, ServerHandle};
pub use stream::StreamBroadcaster;
