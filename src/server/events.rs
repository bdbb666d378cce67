//! Notifications delivered to the hosting application.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::http::request::Method;
use crate::http::response::{ResponseHeader, ResponseKind};

/// One completed request (or started stream), as shown in a request log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub client_ip: String,
    pub timestamp: DateTime<Utc>,
    pub method: Method,
    pub path: Option<String>,
    pub protocol_version: String,
    pub kind: ResponseKind,
}

impl LogEvent {
    /// Builds the event from the head that was actually sent.
    pub fn from_header(peer: &SocketAddr, header: &ResponseHeader) -> Self {
        Self {
            client_ip: peer.ip().to_string(),
            timestamp: header.timestamp,
            method: header.method,
            path: header.path.clone(),
            protocol_version: header.protocol_version.clone(),
            kind: header.kind,
        }
    }
}

/// Fire-and-forget sender for [`LogEvent`]s. Never blocks; events are
/// dropped when nobody listens.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<LogEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<LogEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Creates a sink together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: LogEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("Event receiver gone, dropping log event");
            }
        }
    }
}
