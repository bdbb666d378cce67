use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::http::parser::read_request;
use crate::http::request::{Method, Request};
use crate::http::response::{Catalog, DEFAULT_PROTOCOL, Response, ResponseHeader, ResponseKind};
use crate::http::writer::{ResponseWriter, write_header};
use crate::server::admission::{AdmissionController, AdmissionSlot};
use crate::server::events::{EventSink, LogEvent};
use crate::stream::StreamBroadcaster;

/// How long a rejected connection is drained after the 503 is sent.
const LINGER_TIMEOUT: Duration = Duration::from_millis(500);

/// Everything a worker needs besides its socket. Built once per server and
/// shared by all workers.
#[derive(Clone)]
pub struct ConnectionContext {
    pub admission: AdmissionController,
    pub broadcaster: StreamBroadcaster,
    pub catalog: Arc<Catalog>,
    pub events: EventSink,
    /// Path that switches a request to the MJPEG stream
    pub stream_route: String,
    /// How often a streaming worker checks whether it is still subscribed
    pub poll_interval: Duration,
}

/// Serves exactly one request on one accepted connection.
pub struct Connection {
    stream: Option<BufReader<TcpStream>>,
    peer: SocketAddr,
    ctx: Arc<ConnectionContext>,
    slot: Option<AdmissionSlot>,
    rejected: bool,
    state: ConnectionState,
}

pub enum ConnectionState {
    Admitting,
    Parsing,
    Dispatching(Request),
    Rejected,
    Responding(Response),
    Streaming(ResponseHeader),
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, ctx: Arc<ConnectionContext>) -> Self {
        Self {
            stream: Some(BufReader::new(stream)),
            peer,
            ctx,
            slot: None,
            rejected: false,
            state: ConnectionState::Admitting,
        }
    }

    /// Drives the connection to completion.
    ///
    /// Whatever happens on the way, the socket is closed and an acquired
    /// admission slot is released before this returns.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        self.finish().await;
        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Admitting => match self.ctx.admission.try_acquire() {
                    Some(slot) => {
                        self.slot = Some(slot);
                        ConnectionState::Parsing
                    }
                    None => ConnectionState::Rejected,
                },

                ConnectionState::Parsing => {
                    let request = read_request(self.stream_mut()?).await?;

                    if request.is_serviceable() {
                        ConnectionState::Dispatching(request)
                    } else {
                        // No 400 is sent; the client just sees the close.
                        tracing::warn!(
                            peer = %self.peer,
                            method = %request.method,
                            "No usable request line, closing without response"
                        );
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Dispatching(request) => self.dispatch(&request).await,

                ConnectionState::Rejected => {
                    self.rejected = true;
                    tracing::warn!(
                        peer = %self.peer,
                        capacity = self.ctx.admission.capacity(),
                        "All admission slots busy, answering 503"
                    );
                    let response = self
                        .ctx
                        .catalog
                        .render(ResponseKind::Busy, None, Method::GET, DEFAULT_PROTOCOL)
                        .await;
                    ConnectionState::Responding(response)
                }

                ConnectionState::Responding(response) => {
                    self.respond(&response).await?;
                    ConnectionState::Closed
                }

                ConnectionState::Streaming(header) => {
                    self.stream_frames(&header).await?;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn dispatch(&self, request: &Request) -> ConnectionState {
        let target = request.target();
        let protocol = request.response_version();

        match target {
            Some(target) if target == self.ctx.stream_route => ConnectionState::Streaming(
                self.ctx.catalog.stream_header(&target, request.method, protocol),
            ),
            target => {
                let response = self
                    .ctx
                    .catalog
                    .render(ResponseKind::Ok, target.as_deref(), request.method, protocol)
                    .await;
                ConnectionState::Responding(response)
            }
        }
    }

    async fn respond(&mut self, response: &Response) -> anyhow::Result<()> {
        let stream = self.stream_mut()?;
        ResponseWriter::new(response).write_to_stream(stream).await?;

        tracing::info!(
            peer = %self.peer,
            method = %response.header.method,
            path = response.header.path.as_deref().unwrap_or("-"),
            status = response.header.kind.as_u16(),
            bytes = response.body.len(),
            "Response sent"
        );

        self.ctx
            .events
            .emit(LogEvent::from_header(&self.peer, &response.header));
        Ok(())
    }

    /// Sends the multipart head, hands the write side to the broadcaster and
    /// waits until the read side errors or a delivery to the client fails.
    ///
    /// The admission slot stays held for the whole stream.
    async fn stream_frames(&mut self, header: &ResponseHeader) -> anyhow::Result<()> {
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| anyhow!("connection already closed"))?;

        write_header(&mut stream, header).await?;
        tracing::info!(peer = %self.peer, path = %self.ctx.stream_route, "Stream started");
        self.ctx.events.emit(LogEvent::from_header(&self.peer, header));

        let (mut reader, writer) = stream.into_inner().into_split();
        let broadcaster = &self.ctx.broadcaster;
        let id = broadcaster.subscribe(writer).await;

        let mut ticker = tokio::time::interval(self.ctx.poll_interval);
        let mut scratch = [0u8; 512];
        // EOF only means the client stopped sending; it may still be reading,
        // so the stream runs on until a delivery fails.
        let mut reading = true;

        loop {
            tokio::select! {
                read = reader.read(&mut scratch), if reading => match read {
                    Ok(0) => {
                        tracing::debug!(peer = %self.peer, "Stream client half-closed");
                        reading = false;
                    }
                    Err(_) => break,
                    Ok(_) => {}
                },
                _ = ticker.tick() => {
                    if !broadcaster.is_subscribed(id).await {
                        break;
                    }
                }
            }
        }

        broadcaster.unsubscribe(id).await;
        tracing::info!(peer = %self.peer, subscriber = id, "Stream ended");
        Ok(())
    }

    /// Closes the socket and gives the slot back.
    async fn finish(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            if self.rejected {
                linger(&mut stream).await;
            }
        }

        if self.slot.take().is_some() {
            tracing::trace!(
                peer = %self.peer,
                available = self.ctx.admission.available(),
                "Admission slot released"
            );
        }
    }

    fn stream_mut(&mut self) -> anyhow::Result<&mut BufReader<TcpStream>> {
        self.stream
            .as_mut()
            .ok_or_else(|| anyhow!("connection already closed"))
    }
}

/// Discards whatever the client still sends so closing a socket with an
/// unread request does not reset the connection before the client has read
/// the response.
async fn linger(stream: &mut BufReader<TcpStream>) {
    let drain = async {
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    };
    let _ = tokio::time::timeout(LINGER_TIMEOUT, drain).await;
}
