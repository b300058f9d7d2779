use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use duet_core::RoomId;
use duet_server::{RelayService, serve_listener};
use tokio::net::TcpListener;

/// Timeout for a single expected frame (ms).
pub const RECV_TIMEOUT_MS: u64 = 2000;

/// How long a client waits to be sure nothing arrives (ms).
pub const SILENCE_MS: u64 = 300;

/// Starts a relay on an ephemeral local port.
pub async fn spawn_test_relay() -> Result<(SocketAddr, RelayService)> {
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

    Ok((addr, service))
}

/// Waits until the relay has registered `expected` members in `room`.
pub async fn wait_for_room_size(
    service: &RelayService,
    room: &str,
    expected: usize,
) -> Result<()> {
    let room = RoomId::from(room);
    let start = Instant::now();

    while service.room_size(&room) != expected {
        if start.elapsed() > Duration::from_millis(RECV_TIMEOUT_MS) {
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
