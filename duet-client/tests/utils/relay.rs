use anyhow::{Context, Result};
use duet_core::RoomId;
use duet_server::{RelayService, serve_listener};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

pub const WAIT_TIMEOUT_MS: u64 = 3000;

/// Starts a relay on an ephemeral port and returns its WebSocket URL.
pub async fn spawn_relay() -> Result<(String, RelayService)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind test relay")?;
    let addr = listener.local_addr()?;
    let service = RelayService::new();

    let server_service = service.clone();
    tokio::spawn(async move {
        if let Err(e) = serve_listener(listener, server_service, std::future::pending()).await {
            tracing::error!("[TestRelay] stopped: {:?}", e);
        }
    });

    Ok((format!("ws://{}", addr), service))
}

pub async fn wait_for_room_size(
    service: &RelayService,
    room: &str,
    expected: usize,
) -> Result<()> {
    let room = RoomId::from(room);
    let start = Instant::now();

    while service.room_size(&room) != expected {
        if start.elapsed() > Duration::from_millis(WAIT_TIMEOUT_MS) {
            anyhow::bail!(
                "Timeout waiting for room '{}' to have {} members (has {})",
                room,
                expected,
                service.room_size(&room)
            );
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    Ok(())
}
