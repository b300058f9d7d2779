use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_test_relay, wait_for_room_size};

#[tokio::test]
async fn test_peer_leaves_others_stay() {
    init_tracing();

    let (addr, service) = spawn_test_relay().await.expect("Failed to start relay");

    let mut alice = TestClient::connect("alice", addr).await.expect("connect");
    let mut bob = TestClient::connect("bob", addr).await.expect("connect");
    let mut carol = TestClient::connect("carol", addr).await.expect("connect");
    for client in [&mut alice, &mut bob, &mut carol] {
        client.join("abc123").await.expect("join");
    }
    wait_for_room_size(&service, "abc123", 3).await.expect("all joined");

    carol.close().await.expect("close");
    wait_for_room_size(&service, "abc123", 2)
        .await
        .expect("carol removed from room");

    alice.send_raw(r#"{"type":"end-call"}"#).await.expect("send");
    assert_eq!(bob.recv().await.expect("bob"), r#"{"type":"end-call"}"#);

    alice.close().await.expect("close");
    bob.close().await.expect("close");
    wait_for_room_size(&service, "abc123", 0)
        .await
        .expect("room removed once empty");
    assert_eq!(service.stats().rooms, 0);
}
