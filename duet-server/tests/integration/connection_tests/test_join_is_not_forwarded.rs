use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_test_relay, wait_for_room_size};

#[tokio::test]
async fn test_join_is_not_forwarded() {
    init_tracing();

    let (addr, service) = spawn_test_relay().await.expect("Failed to start relay");

    let mut alice = TestClient::connect("alice", addr).await.expect("connect");
    let mut bob = TestClient::connect("bob", addr).await.expect("connect");

    bob.join("abc123").await.expect("join");
    wait_for_room_size(&service, "abc123", 1).await.expect("bob joined");

    alice.join("abc123").await.expect("join");
    wait_for_room_size(&service, "abc123", 2).await.expect("alice joined");

    // Joining is silent: nobody is told about the newcomer.
    bob.expect_silence().await.expect("join must not be forwarded");
    alice.expect_silence().await.expect("no acknowledgment expected");

    alice.close().await.expect("close");
    bob.close().await.expect("close");
}
