use crate::integration::init_tracing;
use crate::utils::{MockPeer, Participant, PeerOp, spawn_relay, wait_for_room_size};
use duet_client::{CallEvent, SignalingClient, WsConnector};
use duet_core::{IceCandidate, RoomId, SdpKind, SignalMessage};
use std::time::Duration;

#[tokio::test]
async fn test_two_party_call() {
    init_tracing();

    let (url, service) = spawn_relay().await.expect("Failed to start relay");

    let alice_peer = MockPeer::default();
    let bob_peer = MockPeer::default();
    let mut alice = Participant::join("alice", &url, "abc123", alice_peer.clone(), None);
    let mut bob = Participant::join("bob", &url, "abc123", bob_peer.clone(), None);
    wait_for_room_size(&service, "abc123", 2)
        .await
        .expect("both participants joined");

    // A candidate that shows up before any offer has to wait for the
    // remote description on both sides.
    let early = SignalingClient::new(WsConnector::new(url.as_str()));
    early.send(SignalMessage::Ice {
        candidate: IceCandidate::new("candidate:early"),
    });
    early.connect(RoomId::from("abc123"));
    wait_for_room_size(&service, "abc123", 3)
        .await
        .expect("third connection joined");
    tokio::time::sleep(Duration::from_millis(200)).await;
    early.close();
    wait_for_room_size(&service, "abc123", 2)
        .await
        .expect("third connection left");
    assert!(alice_peer.ops().is_empty());
    assert!(bob_peer.ops().is_empty());

    alice.handle.start_call();

    alice
        .wait_for(|e| *e == CallEvent::Connected)
        .await
        .expect("alice connected");
    bob.wait_for(|e| *e == CallEvent::Connected)
        .await
        .expect("bob connected");

    assert_eq!(
        alice_peer.ops(),
        vec![
            PeerOp::AcquireMedia,
            PeerOp::CreateOffer,
            PeerOp::SetRemote(SdpKind::Answer),
            PeerOp::AddCandidate("candidate:early".into()),
        ]
    );
    assert_eq!(
        bob_peer.ops(),
        vec![
            PeerOp::AcquireMedia,
            PeerOp::SetRemote(SdpKind::Offer),
            PeerOp::AddCandidate("candidate:early".into()),
            PeerOp::CreateAnswer,
        ]
    );

    alice.handle.end_call();

    alice
        .wait_for(|e| matches!(e, CallEvent::Ended { .. }))
        .await
        .expect("alice ended");
    bob.wait_for(|e| matches!(e, CallEvent::Ended { .. }))
        .await
        .expect("bob ended by remote hang-up");

    assert_eq!(bob_peer.ops().last(), Some(&PeerOp::Close));
    alice.task.await.expect("alice task");
    bob.task.await.expect("bob task");

    wait_for_room_size(&service, "abc123", 0)
        .await
        .expect("room released after the call");
}
