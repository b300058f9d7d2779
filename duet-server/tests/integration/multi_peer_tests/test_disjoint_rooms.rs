use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_test_relay, wait_for_room_size};

#[tokio::test]
async fn test_disjoint_rooms() {
    init_tracing();

    let (addr, service) = spawn_test_relay().await.expect("Failed to start relay");

    let mut alice = TestClient::connect("alice", addr).await.expect("connect");
    let mut bob = TestClient::connect("bob", addr).await.expect("connect");
    let mut mallory = TestClient::connect("mallory", addr).await.expect("connect");
    let mut trent = TestClient::connect("trent", addr).await.expect("connect");

    alice.join("red").await.expect("join");
    bob.join("red").await.expect("join");
    mallory.join("blue").await.expect("join");
    trent.join("blue").await.expect("join");
    wait_for_room_size(&service, "red", 2).await.expect("red ready");
    wait_for_room_size(&service, "blue", 2).await.expect("blue ready");

    alice.send_raw(r#"{"type":"end-call"}"#).await.expect("send");
    mallory
        .send_raw(r#"{"type":"answer","description":{"type":"answer","sdp":"blue"}}"#)
        .await
        .expect("send");

    assert_eq!(bob.recv().await.expect("bob"), r#"{"type":"end-call"}"#);
    assert!(trent.recv().await.expect("trent").contains("blue"));

    bob.expect_silence().await.expect("no cross-room leakage to red");
    trent.expect_silence().await.expect("no cross-room leakage to blue");

    for client in [alice, bob, mallory, trent] {
        client.close().await.expect("close");
    }
}
