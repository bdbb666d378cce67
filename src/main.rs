use std::time::Duration;

use framecast::server::EventSink;
use framecast::stream::FileFrameSource;
use framecast::{Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let (events, mut event_rx) = EventSink::channel();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            tracing::info!(
                client = %event.client_ip,
                method = %event.method,
                path = event.path.as_deref().unwrap_or("-"),
                protocol = %event.protocol_version,
                status = event.kind.as_u16(),
                "Request served"
            );
        }
    });

    let server = Server::with_events(&cfg, events);

    let mut running = server.watch_running();
    tokio::spawn(async move {
        while running.changed().await.is_ok() {
            let state = *running.borrow_and_update();
            tracing::info!(running = state, "Server state changed");
        }
    });

    if let Some(frame_file) = cfg.stream.frame_file.clone() {
        FileFrameSource::new(frame_file, Duration::from_millis(cfg.stream.frame_interval_ms))
            .spawn(server.broadcaster().clone());
    }

    let handle = server.start().await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            server.close();
        }
        _ = server_stopped(&server) => {}
    }

    handle.wait().await
}

async fn server_stopped(server: &Server) {
    let mut running = server.watch_running();
    let _ = running.wait_for(|running| !running).await;
}
