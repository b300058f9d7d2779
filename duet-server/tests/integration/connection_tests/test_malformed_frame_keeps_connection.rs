use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_test_relay, wait_for_room_size};

#[tokio::test]
async fn test_malformed_frame_keeps_connection() {
    init_tracing();

    let (addr, service) = spawn_test_relay().await.expect("Failed to start relay");

    let mut alice = TestClient::connect("alice", addr).await.expect("connect");
    let mut bob = TestClient::connect("bob", addr).await.expect("connect");
    alice.join("abc123").await.expect("join");
    bob.join("abc123").await.expect("join");
    wait_for_room_size(&service, "abc123", 2).await.expect("both joined");

    for garbage in ["{not json", "[1,2,3]", r#"{"roomId":"abc123"}"#, r#"{"type":"join"}"#] {
        alice.send_raw(garbage).await.expect("send garbage");
    }
    bob.expect_silence().await.expect("malformed frames must be dropped");

    // The connection survives and keeps relaying.
    alice
        .send_raw(r#"{"type":"end-call"}"#)
        .await
        .expect("send after garbage");
    let received = bob.recv().await.expect("relay still alive");
    assert_eq!(received, r#"{"type":"end-call"}"#);
    assert_eq!(service.room_size(&"abc123".into()), 2);

    alice.close().await.expect("close");
    bob.close().await.expect("close");
}
