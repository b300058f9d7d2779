use crate::integration::init_tracing;
use crate::utils::{MockPeer, Participant, spawn_relay, wait_for_room_size};
use duet_client::{CallEvent, PeerEvent};
use std::time::Duration;

#[tokio::test]
async fn test_peer_failure_stays_local() {
    init_tracing();

    let (url, service) = spawn_relay().await.expect("Failed to start relay");

    let mut alice = Participant::join("alice", &url, "flaky", MockPeer::default(), None);
    let mut bob = Participant::join("bob", &url, "flaky", MockPeer::default(), None);
    wait_for_room_size(&service, "flaky", 2)
        .await
        .expect("both participants joined");

    alice.handle.start_call();
    bob.wait_for(|e| *e == CallEvent::Connected)
        .await
        .expect("bob connected");

    // Bob's media path dies; he tears down without telling alice.
    bob.peer_events
        .send(PeerEvent::Closed)
        .await
        .expect("bob's controller is running");
    bob.wait_for(|e| matches!(e, CallEvent::Ended { .. }))
        .await
        .expect("bob ended");
    wait_for_room_size(&service, "flaky", 1)
        .await
        .expect("bob left the room");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!alice.task.is_finished());

    alice.handle.end_call();
    alice
        .wait_for(|e| matches!(e, CallEvent::Ended { .. }))
        .await
        .expect("alice ended");
}
