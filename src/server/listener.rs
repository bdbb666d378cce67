use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionContext};
use crate::http::resolver::FileResolver;
use crate::http::response::Catalog;
use crate::server::admission::AdmissionController;
use crate::server::events::EventSink;
use crate::stream::StreamBroadcaster;

/// The HTTP server: one accept loop, one task per accepted connection.
///
/// Running state is published on a watch channel; hosts can query it with
/// [`Server::is_running`] or follow changes through [`Server::watch_running`].
pub struct Server {
    listen_addr: String,
    ctx: Arc<ConnectionContext>,
    running: Arc<watch::Sender<bool>>,
}

/// Returned by [`Server::start`].
pub struct ServerHandle {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits for the accept loop to end.
    pub async fn wait(self) -> anyhow::Result<()> {
        self.task.await.context("accept loop panicked")
    }
}

impl Server {
    pub fn new(cfg: &Config) -> Self {
        Self::with_events(cfg, EventSink::disabled())
    }

    pub fn with_events(cfg: &Config, events: EventSink) -> Self {
        let ctx = ConnectionContext {
            admission: AdmissionController::new(cfg.server.max_in_flight),
            broadcaster: StreamBroadcaster::new(),
            catalog: Arc::new(Catalog::new(FileResolver::new(cfg.storage.root.clone()))),
            events,
            stream_route: cfg.stream.route.clone(),
            poll_interval: Duration::from_millis(cfg.stream.poll_interval_ms),
        };
        let (running, _) = watch::channel(false);

        Self {
            listen_addr: cfg.server.listen_addr(),
            ctx: Arc::new(ctx),
            running: Arc::new(running),
        }
    }

    /// Broadcaster to feed camera frames into.
    pub fn broadcaster(&self) -> &StreamBroadcaster {
        &self.ctx.broadcaster
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.ctx.admission
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    pub fn watch_running(&self) -> watch::Receiver<bool> {
        self.running.subscribe()
    }

    /// Binds the listening socket and starts accepting in a background task.
    pub async fn start(&self) -> anyhow::Result<ServerHandle> {
        if self.is_running() {
            anyhow::bail!("server already running");
        }

        let listener = TcpListener::bind(&self.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", self.listen_addr))?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        self.running.send_replace(true);
        // Subscribed before spawning so a close() racing the spawn is seen.
        let state = self.running.subscribe();

        let task = tokio::spawn(accept_loop(
            listener,
            self.ctx.clone(),
            self.running.clone(),
            state,
        ));

        Ok(ServerHandle { local_addr, task })
    }

    /// Stops accepting new connections. Workers already running, streams
    /// included, continue until their clients disconnect.
    pub fn close(&self) {
        let was_running = self.running.send_if_modified(|running| {
            let was = *running;
            *running = false;
            was
        });
        if was_running {
            info!("Server closing");
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    ctx: Arc<ConnectionContext>,
    running: Arc<watch::Sender<bool>>,
    mut state: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() || !*state.borrow_and_update() {
                    info!("Listener closed");
                    break;
                }
            }

            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    tracing::debug!("Accepted connection from {}", peer);

                    let ctx = ctx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Connection::new(socket, peer, ctx).run().await {
                            tracing::warn!("Connection error from {}: {}", peer, e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Accept failed, stopping listener");
                    running.send_replace(false);
                    break;
                }
            }
        }
    }
    // The listening socket closes here, when `listener` drops.
}
